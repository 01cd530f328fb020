//! Runtime invariant checks that stay enabled in release builds.
//!
//! Unlike [`debug_assert!`], a failing check always panics, and the panic message names the
//! source location and the expression that failed.

pub fn assert_partial_ord<T: PartialOrd>(_: &T) {}
pub fn assert_same_type<T, U>(_: &T, _: &U) {}

#[track_caller]
pub fn check_failed(location: &str, expr: &str, detail: Option<String>) -> ! {
    match detail {
        Some(detail) => panic!("check failed: {location}: {expr}: {detail}"),
        None => panic!("check failed: {location}: {expr}"),
    }
}

#[allow(unused_macros)]
#[macro_export]
macro_rules! current_location {
    () => {
        format!("{}:{}", file!(), line!())
    };
}
#[allow(unused_imports)]
pub use current_location;

#[allow(unused_macros)]
#[macro_export]
macro_rules! check_le {
    ($lhs:expr, $rhs:expr) => {{
        let lhs = $lhs;
        let rhs = $rhs;
        $crate::util::assert::assert_same_type(&lhs, &rhs);
        $crate::util::assert::assert_partial_ord(&lhs);
        if !(lhs <= rhs) {
            $crate::util::assert::check_failed(
                &$crate::util::assert::current_location!(),
                concat!(stringify!($lhs), " <= ", stringify!($rhs)),
                Some(format!("{:?} vs. {:?}", lhs, rhs)),
            );
        }
    }};
}
#[allow(unused_imports)]
pub use check_le;

#[allow(unused_macros)]
#[macro_export]
macro_rules! check_almost_eq {
    ($lhs:expr, $rhs:expr) => {{
        let lhs = $lhs;
        let rhs = $rhs;
        $crate::util::assert::assert_same_type(&lhs, &rhs);
        if !lhs.almost_eq(rhs) {
            $crate::util::assert::check_failed(
                &$crate::util::assert::current_location!(),
                concat!(stringify!($lhs), " ~= ", stringify!($rhs)),
                Some(format!("{:?} vs. {:?}", lhs, rhs)),
            );
        }
    }};
}
#[allow(unused_imports)]
pub use check_almost_eq;
