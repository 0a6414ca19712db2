//! Fixed form values and control selectors for the partner signup wizard.

pub const SETUP_STEP: &str = "setup";
pub const DETAILS_STEP: &str = "details";
pub const EXPERIENCE_STEP: &str = "professional-experience";
pub const VERIFICATION_STEP: &str = "verification";

pub const INPUT: &str = "input";
pub const SELECT: &str = "select";
pub const FILE_INPUT: &str = r#"input[type="file"]"#;
pub const TEXT_INPUT: &str =
    r#"input:not([type="checkbox"]):not([type="file"]):not([type="radio"])"#;

pub const NEXT_LABEL: &str = "Next";
pub const SUBMIT_LABEL: &str = "Submit";

pub const FIRST_NAME: &str = "John";
pub const LAST_NAME: &str = "Doe";

pub const AGENCY_NAME: &str = "Global Education Partners";
pub const ROLE: &str = "Senior Consultant";
pub const WEBSITE: &str = "www.globaledupartners.com";
pub const ADDRESS: &str = "Durbarmarg, Kathmandu, Nepal";

pub const COUNTRY_LABEL: &str = "Canada";
pub const COUNTRY_VALUE: &str = "CA";
/// Position tried when neither the label nor the value matches.
pub const COUNTRY_FALLBACK_INDEX: usize = 1;

pub const EXPERIENCE_OPTION_INDEX: usize = 1;
pub const SUCCESS_RATE: &str = "75";
pub const FOCUS: &str = "Specializing in undergrad programs for USA/Canada";
pub const VISA_APPROVAL_RATE: &str = "92";

/// Tried in order; the first one that can be clicked wins.
pub const SERVICES: [&str; 4] = [
    "Career Counseling",
    "Admission Applications",
    "Visa Processing",
    "Test Preparation",
];

pub const INSTITUTIONS: [&str; 3] = ["University", "College", "Vocational School"];

pub const CERTIFICATION: &str = "ICBT Certified Education Agent";
