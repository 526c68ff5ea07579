pub mod expert;
pub mod filter;

pub use expert::{
    AcademicMetrics, CurrentRole, Expert, Expertise, Institution, PersonalInfo, Profiles,
    Publications, DEFAULT_AVATAR, MAX_KEYWORDS,
};
pub use filter::{Availability, FilterState, LocationFilter, KNOWN_CITIES};
