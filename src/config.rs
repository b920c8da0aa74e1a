use std::sync::OnceLock;

/// Options read from the `PANNKAKA_CALLSTACK` environment variable.
///
/// The variable holds comma-separated, case-insensitive options:
///
/// - `ascii`: render call stacks with ASCII characters only,
/// - `oldest-first`: list frames in the order they were pushed.
///
/// Unknown options are ignored. The variable is read once per process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CallStackEnvOptions {
    pub(crate) ascii: bool,
    pub(crate) oldest_first: bool,
}

impl CallStackEnvOptions {
    pub(crate) fn get() -> &'static Self {
        static PANNKAKA_CALLSTACK_FLAGS: OnceLock<CallStackEnvOptions> = OnceLock::new();

        PANNKAKA_CALLSTACK_FLAGS.get_or_init(|| {
            std::env::var_os("PANNKAKA_CALLSTACK")
                .map(|var| Self::parse(&var.to_string_lossy()))
                .unwrap_or_default()
        })
    }

    fn parse(var: &str) -> Self {
        let mut options = Self::default();
        for v in var.split(',').map(str::trim) {
            if v.eq_ignore_ascii_case("ascii") {
                options.ascii = true;
            } else if v.eq_ignore_ascii_case("oldest-first") {
                options.oldest_first = true;
            }
        }
        options
    }
}
