use naga::back::{glsl, hlsl};
use shx_output::TargetFormat;
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use thiserror::Error;

const DEFAULT_GLSL_VERSION: glsl::Version = glsl::Version::Desktop(450);
const DEFAULT_SPIRV_VERSION: (u8, u8) = (1, 0);

const GLSL_DESKTOP_VERSIONS: &[u16] = &[140, 150, 330, 400, 410, 420, 430, 440, 450, 460];
const GLSL_ES_VERSIONS: &[u16] = &[300, 310, 320];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileParseError {
    #[error("`{0}` is not a known profile")]
    Unknown(String),
    #[error("`{0}` names an unsupported version")]
    UnsupportedVersion(String),
}

/// Capability level a session compiles against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// `sm_5_0`, `sm_5_1` or `sm_6_0`; usable with every target.
    ShaderModel { major: u8, minor: u8 },
    /// `glsl_<version>` or `glsl_es_<version>`.
    Glsl { version: u16, es: bool },
    /// `spirv_<major>_<minor>`.
    Spirv { major: u8, minor: u8 },
}

impl Profile {
    pub fn parse(name: &str) -> Result<Self, ProfileParseError> {
        if let Some(rest) = name.strip_prefix("sm_") {
            let (major, minor) = parse_major_minor(name, rest)?;
            let profile = Self::ShaderModel { major, minor };

            return match profile.hlsl_shader_model() {
                Some(_) => Ok(profile),
                None => Err(ProfileParseError::UnsupportedVersion(name.to_owned())),
            };
        }

        if let Some(rest) = name.strip_prefix("glsl_es_") {
            let version = parse_number(name, rest)?;

            if !GLSL_ES_VERSIONS.contains(&version) {
                return Err(ProfileParseError::UnsupportedVersion(name.to_owned()));
            }

            return Ok(Self::Glsl { version, es: true });
        }

        if let Some(rest) = name.strip_prefix("glsl_") {
            let version = parse_number(name, rest)?;

            if !GLSL_DESKTOP_VERSIONS.contains(&version) {
                return Err(ProfileParseError::UnsupportedVersion(name.to_owned()));
            }

            return Ok(Self::Glsl { version, es: false });
        }

        if let Some(rest) = name.strip_prefix("spirv_") {
            let (major, minor) = parse_major_minor(name, rest)?;

            if major != 1 || 6 < minor {
                return Err(ProfileParseError::UnsupportedVersion(name.to_owned()));
            }

            return Ok(Self::Spirv { major, minor });
        }

        Err(ProfileParseError::Unknown(name.to_owned()))
    }

    pub fn supports(self, target: TargetFormat) -> bool {
        match self {
            Self::ShaderModel { .. } => true,
            Self::Glsl { .. } => target == TargetFormat::Glsl,
            Self::Spirv { .. } => target == TargetFormat::Spirv,
        }
    }

    pub(crate) fn hlsl_shader_model(self) -> Option<hlsl::ShaderModel> {
        let (major, minor) = match self {
            Self::ShaderModel { major, minor } => (major, minor),
            _ => return None,
        };

        let model = match (major, minor) {
            (5, 0) => hlsl::ShaderModel::V5_0,
            (5, 1) => hlsl::ShaderModel::V5_1,
            (6, 0) => hlsl::ShaderModel::V6_0,
            _ => return None,
        };

        Some(model)
    }

    pub(crate) fn glsl_version(self) -> glsl::Version {
        match self {
            Self::Glsl { version, es: false } => glsl::Version::Desktop(version),
            Self::Glsl { version, es: true } => glsl::Version::Embedded {
                version,
                is_webgl: false,
            },
            _ => DEFAULT_GLSL_VERSION,
        }
    }

    pub(crate) fn spirv_version(self) -> (u8, u8) {
        match self {
            Self::Spirv { major, minor } => (major, minor),
            _ => DEFAULT_SPIRV_VERSION,
        }
    }
}

impl FromStr for Profile {
    type Err = ProfileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Profile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ShaderModel { major, minor } => write!(f, "sm_{}_{}", major, minor),
            Self::Glsl { version, es: false } => write!(f, "glsl_{}", version),
            Self::Glsl { version, es: true } => write!(f, "glsl_es_{}", version),
            Self::Spirv { major, minor } => write!(f, "spirv_{}_{}", major, minor),
        }
    }
}

fn parse_number<T: FromStr>(name: &str, digits: &str) -> Result<T, ProfileParseError> {
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(ProfileParseError::Unknown(name.to_owned()));
    }

    digits
        .parse()
        .map_err(|_| ProfileParseError::Unknown(name.to_owned()))
}

fn parse_major_minor(name: &str, rest: &str) -> Result<(u8, u8), ProfileParseError> {
    let (major, minor) = match rest.split_once('_') {
        Some(parts) => parts,
        None => return Err(ProfileParseError::Unknown(name.to_owned())),
    };

    Ok((parse_number(name, major)?, parse_number(name, minor)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_profiles() {
        assert_eq!(
            Profile::parse("sm_6_0"),
            Ok(Profile::ShaderModel { major: 6, minor: 0 })
        );
        assert_eq!(
            Profile::parse("glsl_450"),
            Ok(Profile::Glsl {
                version: 450,
                es: false
            })
        );
        assert_eq!(
            Profile::parse("glsl_es_300"),
            Ok(Profile::Glsl {
                version: 300,
                es: true
            })
        );
        assert_eq!(
            Profile::parse("spirv_1_3"),
            Ok(Profile::Spirv { major: 1, minor: 3 })
        );
    }

    #[test]
    fn test_parse_rejects_unknown_profiles() {
        assert!(matches!(
            Profile::parse("vs_5_0"),
            Err(ProfileParseError::Unknown(_))
        ));
        assert!(matches!(
            Profile::parse("sm_6"),
            Err(ProfileParseError::Unknown(_))
        ));
        assert!(matches!(
            Profile::parse("glsl_+450"),
            Err(ProfileParseError::Unknown(_))
        ));
        assert!(matches!(
            Profile::parse("sm_4_0"),
            Err(ProfileParseError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            Profile::parse("sm_6_1"),
            Err(ProfileParseError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            Profile::parse("glsl_451"),
            Err(ProfileParseError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            Profile::parse("spirv_2_0"),
            Err(ProfileParseError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_display_matches_parse() {
        for name in ["sm_5_1", "glsl_330", "glsl_es_310", "spirv_1_5"] {
            assert_eq!(Profile::parse(name).unwrap().to_string(), name);
        }
    }

    #[test]
    fn test_profile_target_compatibility() {
        let shader_model = Profile::parse("sm_6_0").unwrap();
        let glsl = Profile::parse("glsl_450").unwrap();
        let spirv = Profile::parse("spirv_1_0").unwrap();

        assert!(shader_model.supports(TargetFormat::Glsl));
        assert!(shader_model.supports(TargetFormat::Spirv));
        assert!(glsl.supports(TargetFormat::Glsl));
        assert!(!glsl.supports(TargetFormat::Hlsl));
        assert!(!spirv.supports(TargetFormat::Glsl));
        assert_eq!(shader_model.glsl_version(), DEFAULT_GLSL_VERSION);
        assert_eq!(spirv.spirv_version(), (1, 0));
    }
}
