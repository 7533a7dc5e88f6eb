/// Writes a `[trace]` line to stderr when `$enabled` is true.
#[macro_export]
macro_rules! shell_trace {
    ($enabled:expr, $($arg:tt)*) => {
        if $enabled {
            eprintln!("[trace] {}", format_args!($($arg)*));
        }
    };
}
