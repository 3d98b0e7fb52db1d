mod collector_test;
mod config_test;
mod population_test;

use assertables::*;
use kb_core::clock::mock::MockUtcClock;
use kb_core::prelude::*;
use kb_testutils::*;
use rstest::*;

use super::*;
use crate::mock::MockClusterAccessor;
