//! Named boolean checks.
use crate::metrics::Registry;

/// Records a pass/fail sample for the named check and hands the result back.
///
/// The evaluation itself belongs to the caller; the harness only names and
/// tallies it. Check pass counts show up in the end-of-run report.
///
/// ```
/// use drizzle::check;
///
/// let status = 200;
/// let ok = check("status is 200", status == 200);
/// assert!(ok);
/// ```
pub fn check(name: &str, passed: bool) -> bool {
    Registry::global().check(name).add(passed);
    passed
}
