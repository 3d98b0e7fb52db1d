mod roster_test;

use assertables::*;
use clap::Parser;
use kb_arena::mock::MockClusterAccessor;
use kb_arena::*;
use kb_core::clock::mock::MockUtcClock;
use kb_core::prelude::*;
use kb_testutils::*;
use rstest::*;

use super::*;
