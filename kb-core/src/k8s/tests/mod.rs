
use assertables::*;
use kb_testutils::*;
use rstest::*;

use super::*;
