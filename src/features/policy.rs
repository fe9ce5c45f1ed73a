//! Column policy: static enumerations consumed by the feature pipeline
//!
//! Pure data — the closed categorical set, the unconditional drop list for
//! the applicant table, and the sentinel constants shared across modules.

use polars::prelude::*;

/// Applicant key shared by all three raw tables.
pub const ID_COL: &str = "SK_ID_CURR";

/// Label column of the training applicant table.
pub const TARGET_COL: &str = "TARGET";

/// Common prefix of the document-flag indicator family.
pub const DOC_FLAG_PREFIX: &str = "FLAG_DOCUMENT_";

/// The single document flag that survives transformation.
pub const DOC_FLAG_KEPT: &str = "FLAG_DOCUMENT_3";

/// Encodes "currently unemployed / not applicable" in DAYS_EMPLOYED.
pub const DAYS_EMPLOYED_SENTINEL: i64 = 365_243;

/// Fill value for missing categorical cells handed to the classifier.
pub const CATEGORICAL_MISSING: &str = "__MISSING__";

/// Closed set of categorical columns in the applicant table.
pub const CAT_FEATURES: [&str; 12] = [
    "NAME_CONTRACT_TYPE",
    "CODE_GENDER",
    "FLAG_OWN_CAR",
    "FLAG_OWN_REALTY",
    "NAME_TYPE_SUITE",
    "NAME_INCOME_TYPE",
    "NAME_EDUCATION_TYPE",
    "NAME_FAMILY_STATUS",
    "NAME_HOUSING_TYPE",
    "OCCUPATION_TYPE",
    "WEEKDAY_APPR_PROCESS_START",
    "ORGANIZATION_TYPE",
];

/// Columns dropped unconditionally from the applicant table: redundant
/// building-metric variants, near-constant flags, high-correlation columns,
/// and the raw applicant id once it is no longer needed as a join key.
/// Absence of any of these in the input is not an error.
pub const DROP_COLS: [&str; 66] = [
    ID_COL,
    // common area
    "COMMONAREA_AVG",
    "COMMONAREA_MODE",
    "COMMONAREA_MEDI",
    // nonliving apartments
    "NONLIVINGAPARTMENTS_AVG",
    "NONLIVINGAPARTMENTS_MODE",
    "NONLIVINGAPARTMENTS_MEDI",
    // nonliving area
    "NONLIVINGAREA_AVG",
    "NONLIVINGAREA_MODE",
    "NONLIVINGAREA_MEDI",
    // land area
    "LANDAREA_AVG",
    "LANDAREA_MODE",
    "LANDAREA_MEDI",
    // basement
    "BASEMENTAREA_AVG",
    "BASEMENTAREA_MODE",
    "BASEMENTAREA_MEDI",
    // living apartments
    "LIVINGAPARTMENTS_AVG",
    "LIVINGAPARTMENTS_MODE",
    "LIVINGAPARTMENTS_MEDI",
    // floors
    "FLOORSMIN_AVG",
    "FLOORSMIN_MODE",
    "FLOORSMIN_MEDI",
    "FLOORSMAX_AVG",
    "FLOORSMAX_MODE",
    "FLOORSMAX_MEDI",
    // entrances
    "ENTRANCES_AVG",
    "ENTRANCES_MODE",
    "ENTRANCES_MEDI",
    // build years
    "YEARS_BUILD_AVG",
    "YEARS_BUILD_MODE",
    "YEARS_BUILD_MEDI",
    "YEARS_BEGINEXPLUATATION_AVG",
    "YEARS_BEGINEXPLUATATION_MODE",
    "YEARS_BEGINEXPLUATATION_MEDI",
    "OWN_CAR_AGE",
    // housing
    "FONDKAPREMONT_MODE",
    "HOUSETYPE_MODE",
    "WALLSMATERIAL_MODE",
    "EMERGENCYSTATE_MODE",
    "TOTALAREA_MODE",
    // elevators
    "ELEVATORS_AVG",
    "ELEVATORS_MODE",
    "ELEVATORS_MEDI",
    // near-constant flags
    "FLAG_MOBIL",
    "FLAG_CONT_MOBILE",
    // high correlation
    "OBS_60_CNT_SOCIAL_CIRCLE",
    "LIVINGAREA_MEDI",
    "APARTMENTS_MEDI",
    "AMT_GOODS_PRICE",
    "APARTMENTS_MODE",
    "LIVINGAREA_MODE",
    "REGION_RATING_CLIENT",
    "LIVINGAREA_AVG",
    "CNT_CHILDREN",
    "DEF_60_CNT_SOCIAL_CIRCLE",
    "LIVE_REGION_NOT_WORK_REGION",
    "LIVE_CITY_NOT_WORK_CITY",
    // uninformative
    "AMT_REQ_CREDIT_BUREAU_HOUR",
    "AMT_REQ_CREDIT_BUREAU_DAY",
    "AMT_REQ_CREDIT_BUREAU_WEEK",
    "FLAG_EMAIL",
    "FLAG_WORK_PHONE",
    "FLAG_PHONE",
    "HOUR_APPR_PROCESS_START",
    "REG_REGION_NOT_LIVE_REGION",
    "REG_REGION_NOT_WORK_REGION",
];

/// Zero-guarded ratio expression: `num / den` with a zero denominator mapped
/// to null before dividing, so the ratio is null rather than ±inf. Both
/// operands are cast to Float64 first; a null operand yields a null ratio.
pub fn safe_ratio(num: Expr, den: Expr) -> Expr {
    let den = den.cast(DataType::Float64);
    let den = when(den.clone().eq(lit(0.0)))
        .then(lit(NULL))
        .otherwise(den);
    num.cast(DataType::Float64) / den
}
