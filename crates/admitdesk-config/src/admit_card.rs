use crate::env::string_or;

/// Institute details printed on admit cards and in delivery emails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdmitCardConfig {
    pub institute_name: String,
    pub exam_title: String,
    pub helpline: String,
    pub website: String,
    pub signature_lines: Vec<String>,
}

impl Default for AdmitCardConfig {
    fn default() -> Self {
        Self {
            institute_name: "British School Gurukul".to_string(),
            exam_title: "Super 30 South Bihar Talent Search Examination".to_string(),
            helpline: "7766994020, 7766994006".to_string(),
            website: "www.britishenglishschool.in".to_string(),
            signature_lines: vec![
                "British English School".to_string(),
                "Manpur, Gere, Gaya (Bihar)".to_string(),
                "PIN - 823003".to_string(),
            ],
        }
    }
}

impl AdmitCardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            institute_name: string_or("INSTITUTE_NAME", &defaults.institute_name),
            exam_title: string_or("EXAM_TITLE", &defaults.exam_title),
            helpline: string_or("HELPLINE_NUMBERS", &defaults.helpline),
            website: string_or("INSTITUTE_WEBSITE", &defaults.website),
            signature_lines: std::env::var("EMAIL_SIGNATURE")
                .map(|v| v.split('|').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.signature_lines),
        }
    }
}
