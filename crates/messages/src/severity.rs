use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Verbosity tier of a message, ordered from quietest to noisiest.
///
/// The derived ordering is the filtering order: a message is visible when its
/// severity is at or below both the source ceiling and the overall verbosity.
/// [`Quiet`](Self::Quiet) is a pass-through class for normal program output
/// funnelled through the same serialized channel; it is rendered verbatim and,
/// being the minimum, is never filtered by a source ceiling.
///
/// # Examples
///
/// ```
/// use messages::Severity;
///
/// assert!(Severity::Quiet < Severity::Errors);
/// assert!(Severity::Errors < Severity::MajorSteps);
/// assert!(Severity::MinorSteps < Severity::Everything);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Verbatim pass-through of normal program output.
    Quiet,
    /// Error reports.
    Errors,
    /// Coarse progress steps.
    MajorSteps,
    /// Fine-grained progress steps.
    MinorSteps,
    /// Everything, including debug chatter.
    Everything,
}

impl Severity {
    /// All severities in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use messages::Severity;
    ///
    /// assert!(Severity::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    /// ```
    pub const ALL: [Self; 5] = [
        Self::Quiet,
        Self::Errors,
        Self::MajorSteps,
        Self::MinorSteps,
        Self::Everything,
    ];

    /// Returns the kebab-case token used by [`Display`](fmt::Display) and
    /// [`FromStr`].
    ///
    /// # Examples
    ///
    /// ```
    /// use messages::Severity;
    ///
    /// assert_eq!(Severity::MajorSteps.as_str(), "major-steps");
    /// assert_eq!(Severity::Everything.as_str(), "everything");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quiet => "quiet",
            Self::Errors => "errors",
            Self::MajorSteps => "major-steps",
            Self::MinorSteps => "minor-steps",
            Self::Everything => "everything",
        }
    }

    /// Returns the prefix rendered ahead of the source name.
    ///
    /// Both step tiers share the `"Info:  "` prefix; only the tier ordering
    /// distinguishes them, not the rendered text. [`Quiet`](Self::Quiet) has
    /// no prefix because quiet messages are rendered verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// use messages::Severity;
    ///
    /// assert_eq!(Severity::Errors.prefix(), "Error: ");
    /// assert_eq!(Severity::MinorSteps.prefix(), "Info:  ");
    /// assert_eq!(Severity::Everything.prefix(), "Debug: ");
    /// assert_eq!(Severity::Quiet.prefix(), "");
    /// ```
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Quiet => "",
            Self::Errors => "Error: ",
            Self::MajorSteps | Self::MinorSteps => "Info:  ",
            Self::Everything => "Debug: ",
        }
    }

    /// Reports whether this is the verbatim pass-through tier.
    ///
    /// # Examples
    ///
    /// ```
    /// use messages::Severity;
    ///
    /// assert!(Severity::Quiet.is_quiet());
    /// assert!(!Severity::Errors.is_quiet());
    /// ```
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Severity`] from a string fails.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unrecognised severity")]
pub struct ParseSeverityError {
    _private: (),
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "quiet" => Ok(Self::Quiet),
            "errors" => Ok(Self::Errors),
            "major-steps" => Ok(Self::MajorSteps),
            "minor-steps" => Ok(Self::MinorSteps),
            "everything" => Ok(Self::Everything),
            _ => Err(ParseSeverityError { _private: () }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_declaration() {
        assert!(Severity::Quiet < Severity::Errors);
        assert!(Severity::Errors < Severity::MajorSteps);
        assert!(Severity::MajorSteps < Severity::MinorSteps);
        assert!(Severity::MinorSteps < Severity::Everything);
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for severity in Severity::ALL {
            let token = severity.to_string();
            assert_eq!(token.parse::<Severity>(), Ok(severity));
        }
    }

    #[test]
    fn from_str_rejects_unknown_tokens() {
        assert!("verbose".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
        assert!("QUIET".parse::<Severity>().is_err());
    }

    #[test]
    fn step_tiers_share_the_info_prefix() {
        assert_eq!(Severity::MajorSteps.prefix(), Severity::MinorSteps.prefix());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_round_trip() {
        for severity in Severity::ALL {
            let json = serde_json::to_string(&severity).expect("serialize");
            let back: Severity = serde_json::from_str(&json).expect("deserialize");
            assert_eq!(back, severity);
        }
    }
}
