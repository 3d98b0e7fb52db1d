pub const TEST_NAMESPACE: &str = "test-namespace";
pub const TEST_POD: &str = "the-pod";
pub const TEST_DEPLOYMENT: &str = "the-deployment";
pub const TEST_STATEFUL_SET: &str = "the-statefulset";

// Everything in the fixtures is created at TEST_START_TS, and tests that care about ages run
// their mock clock from TEST_NOW_TS
pub const TEST_START_TS: i64 = 1_700_000_000;
pub const TEST_NOW_TS: i64 = TEST_START_TS + 3600;
