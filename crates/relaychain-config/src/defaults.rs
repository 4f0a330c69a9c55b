//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `relaychain_core::defaults`.

use relaychain_core::defaults;

/// Generate default value functions that forward to relaychain_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_max_fails          => DEFAULT_MAX_FAILS: u32,
    default_fail_timeout_secs  => DEFAULT_FAIL_TIMEOUT_SECS: u64,
    default_dns_cache_size     => DEFAULT_DNS_CACHE_SIZE: usize,
}

default_string_fns! {
    default_connector_type => DEFAULT_CONNECTOR_TYPE,
    default_dialer_type    => DEFAULT_DIALER_TYPE,
}
