use kb_arena::BattleReport;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    // Text rendering is different for every kind of output, so the caller supplies it
    pub fn render<T: Serialize>(&self, obj: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<String> {
        match self {
            OutputFormat::Text => Ok(text(obj)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(obj)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(obj)?),
        }
    }

    pub fn render_report(&self, report: &BattleReport) -> anyhow::Result<String> {
        match self {
            OutputFormat::Text => Ok(report.to_text()),
            OutputFormat::Json => report.to_json(),
            OutputFormat::Yaml => report.to_yaml(),
        }
    }
}
