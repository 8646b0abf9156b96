/***************************************/
/*               Macros                */
/***************************************/
/// Unwraps a `Result` at the binary boundary, or logs the error with a short
/// description of what failed and exits with status 1.
#[macro_export]
macro_rules! unwrap_or_exit {
    ($expr:expr, $context:expr) => {
        match $expr {
            Ok(val) => val,
            Err(e) => {
                log::error!("{}: {}", $context, e);
                std::process::exit(1);
            }
        }
    };
}
