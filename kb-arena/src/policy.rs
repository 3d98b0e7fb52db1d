use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::*;

use crate::collector::MetricsSnapshot;
use crate::combatant::{
    Action,
    Combatant,
    CombatantKind,
};
use crate::errors::BattleError;
use crate::population::Population;

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    Random,
    Youngest,
    Oldest,
    ResourceHog,
}

impl Strategy {
    pub fn needs_usage(&self) -> bool {
        matches!(self, Strategy::ResourceHog)
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Strategy> {
        match s.to_lowercase().as_str() {
            "random" => Ok(Strategy::Random),
            "youngest" => Ok(Strategy::Youngest),
            "oldest" => Ok(Strategy::Oldest),
            "resource-hog" | "resourcehog" => Ok(Strategy::ResourceHog),
            _ => Err(BattleError::invalid_configuration(&format!("unknown strategy: {s}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Strategy::Random => "random",
            Strategy::Youngest => "youngest",
            Strategy::Oldest => "oldest",
            Strategy::ResourceHog => "resource-hog",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Selection<'a> {
    pub victim: &'a Combatant,
    pub action: Action,

    // Set when the requested strategy couldn't be applied and we picked at random instead
    pub fallback: bool,
}

pub fn action_for(combatant: &Combatant) -> Action {
    match combatant.kind {
        CombatantKind::Pod => Action::DeletePod,
        _ => Action::ScaleDown {
            from: combatant.replicas,
            to: (combatant.replicas - 1).max(0),
        },
    }
}

/// Pick the next combatant to eliminate.
///
/// Ties in any of the ordered strategies go to the combatant whose name sorts first.  The
/// random strategy (and the resource-hog fallback) draws from the population in name order, so
/// a seeded `rng` always produces the same sequence of victims for the same cluster state.
pub fn select<'a, R: Rng + ?Sized>(
    population: &'a Population,
    strategy: Strategy,
    metrics: &MetricsSnapshot,
    rng: &mut R,
) -> anyhow::Result<Selection<'a>> {
    let combatants = population.combatants();
    let mut fallback = false;

    let victim = match strategy {
        Strategy::Random => combatants.choose(rng),
        Strategy::Youngest => combatants
            .iter()
            .min_by(|a, b| b.created.cmp(&a.created).then_with(|| a.name.cmp(&b.name))),
        Strategy::Oldest => combatants
            .iter()
            .min_by(|a, b| a.created.cmp(&b.created).then_with(|| a.name.cmp(&b.name))),
        Strategy::ResourceHog => {
            let hog = combatants
                .iter()
                .filter_map(|c| metrics.usage_of(&c.key()).map(|u| (c, u)))
                .min_by(|(a, ua), (b, ub)| ub.cmp(ua).then_with(|| a.name.cmp(&b.name)))
                .map(|(c, _)| c);
            if hog.is_none() && !combatants.is_empty() {
                info!("no resource usage data available, falling back to random selection");
                fallback = true;
                combatants.choose(rng)
            } else {
                hog
            }
        },
    };

    let Some(victim) = victim else {
        return Err(BattleError::empty_population(&format!("{strategy} selection")));
    };

    Ok(Selection { victim, action: action_for(victim), fallback })
}
