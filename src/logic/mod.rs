//! Registration workflows on top of `TournamentApi`: validation, the wizard, ranking edits,
//! login and dashboard views.

mod dashboard;
mod login;
mod rankings;
mod validation;
mod wizard;

pub use dashboard::{
    filter_registrations, format_date, registrations_csv, table_state, DashboardError,
    DetailLine, EventCard, PlayerDashboardView, TableState, NOT_AVAILABLE, NOT_PROVIDED,
    NO_PARTNER,
};
pub use login::{admin_login, player_login, restore_admin_session, AdminSessionState, LoginError};
pub use rankings::{
    guard_leave, EventFilter, InvalidRankingKey, Outcome, RankingBoard, RankingKey, RankingUpdate,
    SaveReport, UnsavedChanges, UpdateOutcome,
};
pub use validation::{
    is_valid_email, is_valid_phone, normalize_phone, validate_login, validate_profile,
    ProfileErrors, ProfileField, ProfileForm,
};
pub use wizard::{
    available_partners, EventSelection, InvalidPartnerChoice, PartnerChoice,
    RegistrationConflict, RegistrationWizard, SelectionError, WizardError, WizardMode, WizardStep,
    CURRENT_PARTNER_LABEL,
};
