use crate::errors::CliError;
use regex::Regex;

pub mod config;
pub mod tools;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

pub fn is_valid_slug(name: impl AsRef<str>) -> bool {
    Regex::new(r"^[[:word:]-]+$")
        .map(|re| re.is_match(name.as_ref()))
        .unwrap_or(false)
}

pub fn validate_suffix(suffix: impl AsRef<str>) -> Result<(), CliError> {
    let suffix = suffix.as_ref();
    if !is_valid_slug(suffix) {
        return Err(CliError::invalid_suffix(suffix.to_string(), None));
    }

    Ok(())
}

pub fn validate_version_format(version: impl AsRef<str>) -> Result<(), CliError> {
    let version_str = version.as_ref();
    if semver::Version::parse(version_str).is_err() {
        return Err(CliError::invalid_version(version_str.to_string(), None));
    }

    Ok(())
}
