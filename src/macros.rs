/// `let Some(v) = e else { continue }` for loops over sparse cells.
macro_rules! unwrap_option_or_continue {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => continue,
        }
    };
}

macro_rules! unwrap_option_or_break {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => break,
        }
    };
}

/// Early return on a missing value, optionally with a fallback result.
macro_rules! unwrap_option_or_return {
    ($e:expr) => {
        match $e {
            Some(v) => v,
            None => return,
        }
    };

    ($e:expr, $ret:expr) => {
        match $e {
            Some(v) => v,
            None => return $ret,
        }
    };
}
