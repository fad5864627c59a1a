//! Wire types shared between the club planner server and its clients.
//!
//! Dates travel as `YYYY-MM-DD`, times as `HH:MM`, weekdays as ISO numbers
//! (1 = Monday .. 7 = Sunday). Field names are snake_case JSON.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Auth and users
// ---------------------------------------------------------------------------

/// Role of a login account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Trainer,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public view of a user account (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub trainer_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    /// Same JWT that is set in the `token` cookie, for non-browser clients
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Option<Role>,
    pub password: Option<String>,
    /// `Some("")` unlinks the trainer
    pub trainer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

// ---------------------------------------------------------------------------
// Trainers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: f64,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrainerRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: f64,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTrainerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub hourly_rate: Option<f64>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerListResponse {
    pub trainers: Vec<Trainer>,
}

/// Hours and cost of one trainer over a date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerHours {
    pub trainer_id: String,
    pub trainer_name: String,
    pub activity_count: u32,
    pub hours: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerHoursResponse {
    pub start: String,
    pub end: String,
    pub trainers: Vec<TrainerHours>,
}

// ---------------------------------------------------------------------------
// Training types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingType {
    pub id: String,
    pub name: String,
    pub color: String,
    pub default_trainer_id: Option<String>,
    pub default_hours: f64,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTrainingTypeRequest {
    pub name: String,
    pub color: String,
    pub default_trainer_id: Option<String>,
    pub default_hours: f64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTrainingTypeRequest {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some("")` clears the default trainer
    pub default_trainer_id: Option<String>,
    pub default_hours: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingTypeListResponse {
    pub training_types: Vec<TrainingType>,
}

// ---------------------------------------------------------------------------
// Activities and recurring series
// ---------------------------------------------------------------------------

/// Activity enriched with the names needed to render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityView {
    pub id: String,
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub hours: f64,
    pub training_type_id: String,
    pub training_type_name: String,
    pub color: String,
    pub trainer_ids: Vec<String>,
    pub trainer_names: Vec<String>,
    pub notes: Option<String>,
    pub series_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateActivityRequest {
    pub date: String,
    pub training_type_id: String,
    /// Falls back to the training type's default trainer when absent
    pub trainer_ids: Option<Vec<String>>,
    /// Falls back to the training type's default hours when absent
    pub hours: Option<f64>,
    pub start_time: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateActivityRequest {
    pub date: Option<String>,
    pub training_type_id: Option<String>,
    pub trainer_ids: Option<Vec<String>>,
    pub hours: Option<f64>,
    /// `Some("")` clears the start time
    pub start_time: Option<String>,
    pub notes: Option<String>,
    /// Remove the activity from its recurring series
    #[serde(default)]
    pub detach: bool,
}

/// Two activities of one trainer that overlap on the same day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    pub date: String,
    pub trainer_id: String,
    pub trainer_name: String,
    pub first_activity_id: String,
    pub second_activity_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResponse {
    pub activity: ActivityView,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityListResponse {
    pub activities: Vec<ActivityView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictListResponse {
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub id: String,
    pub training_type_id: String,
    pub trainer_ids: Vec<String>,
    pub weekdays: Vec<u8>,
    pub start_date: String,
    pub end_date: String,
    pub hours: f64,
    pub start_time: Option<String>,
    pub notes: Option<String>,
    pub excluded_dates: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSeriesRequest {
    pub training_type_id: String,
    pub trainer_ids: Option<Vec<String>>,
    pub weekdays: Vec<u8>,
    pub start_date: String,
    pub end_date: String,
    pub hours: Option<f64>,
    pub start_time: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub excluded_dates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateSeriesRequest {
    pub training_type_id: Option<String>,
    pub trainer_ids: Option<Vec<String>>,
    pub weekdays: Option<Vec<u8>>,
    pub end_date: Option<String>,
    pub hours: Option<f64>,
    /// `Some("")` clears the start time
    pub start_time: Option<String>,
    pub notes: Option<String>,
    pub excluded_dates: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesResponse {
    pub series: RecurringSeries,
    pub activity_count: usize,
    pub conflicts: Vec<Conflict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesListResponse {
    pub series: Vec<RecurringSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteSeriesResponse {
    pub deleted_activities: usize,
    pub series_removed: bool,
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Padding cell before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
    /// Padding cell after the last day of the month
    PaddingAfter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day of month, 0 for padding cells
    pub day: u32,
    /// Full date, also set on padding cells so clients can navigate
    pub date: String,
    /// 1 = Monday .. 7 = Sunday
    pub weekday: u32,
    pub day_type: CalendarDayType,
    pub is_today: bool,
    pub activities: Vec<ActivityView>,
    pub total_hours: f64,
}

/// One Monday-first row of a month grid
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarWeekRow {
    pub iso_week: u32,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub month_name: String,
    pub weeks: Vec<CalendarWeekRow>,
    pub total_hours: f64,
    pub activity_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarYear {
    pub year: i32,
    pub months: Vec<CalendarMonth>,
    pub total_hours: f64,
    pub activity_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarWeek {
    pub iso_year: i32,
    pub iso_week: u32,
    pub start_date: String,
    pub end_date: String,
    pub days: Vec<CalendarDay>,
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CurrentDateResponse {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub iso_year: i32,
    pub iso_week: u32,
    pub formatted_date: String,
    pub iso_date: String,
}

// ---------------------------------------------------------------------------
// Training packages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPackage {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub sessions: u32,
    pub price: f64,
    pub validity_days: Option<u32>,
    pub training_type_ids: Vec<String>,
    pub active: bool,
    /// Price divided by sessions
    pub price_per_session: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePackageRequest {
    pub name: String,
    pub description: Option<String>,
    pub sessions: u32,
    pub price: f64,
    pub validity_days: Option<u32>,
    #[serde(default)]
    pub training_type_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sessions: Option<u32>,
    pub price: Option<f64>,
    pub validity_days: Option<u32>,
    pub training_type_ids: Option<Vec<String>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageListResponse {
    pub packages: Vec<TrainingPackage>,
}

// ---------------------------------------------------------------------------
// Budget
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    /// Costs computed from the activities of one training type
    Auto,
    /// Costs and income entered by hand
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoneyFlow {
    Cost,
    Income,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSection {
    pub id: String,
    pub year: i32,
    pub name: String,
    pub kind: SectionKind,
    pub training_type_id: Option<String>,
    pub planned_amount: Option<f64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBudgetSectionRequest {
    pub year: i32,
    pub name: String,
    pub kind: SectionKind,
    pub training_type_id: Option<String>,
    pub planned_amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBudgetSectionRequest {
    pub name: Option<String>,
    /// Absent leaves the plan alone, `null` removes it
    #[serde(default, deserialize_with = "explicit_null", skip_serializing_if = "Option::is_none")]
    pub planned_amount: Option<Option<f64>>,
    /// Auto sections only
    pub training_type_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSectionListResponse {
    pub sections: Vec<BudgetSection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntry {
    pub id: String,
    pub section_id: String,
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub flow: MoneyFlow,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateBudgetEntryRequest {
    pub date: String,
    pub description: String,
    pub amount: f64,
    pub flow: MoneyFlow,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateBudgetEntryRequest {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub flow: Option<MoneyFlow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEntryListResponse {
    pub entries: Vec<BudgetEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCostSummary {
    pub training_type_id: String,
    pub training_type_name: String,
    pub activity_count: u32,
    pub hours: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCost {
    pub month: u32,
    pub hours: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// None for the "Unassigned activities" line
    pub section_id: Option<String>,
    pub name: String,
    pub kind: SectionKind,
    pub costs: f64,
    pub income: f64,
    pub planned: Option<f64>,
    pub remaining: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetReport {
    pub year: i32,
    pub by_type: Vec<TypeCostSummary>,
    pub by_trainer: Vec<TrainerHours>,
    pub by_month: Vec<MonthlyCost>,
    pub sections: Vec<SectionSummary>,
    pub total_costs: f64,
    pub total_income: f64,
    pub net: f64,
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Body of every error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

fn default_true() -> bool {
    true
}

/// Tells a missing field (`None`, via `serde(default)`) apart from an
/// explicit `null` (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
