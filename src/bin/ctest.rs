// ctest: runs the harness self-test suite.
// Usage: ctest [--quiet] [--json] [--filter SUBSTR] [--config FILE]

fn main() {
    ctest::cli::run();
}
