//! Column names of the tree-inventory schema the cascade relies on.

/// Diameter at breast height.
pub const DBH: &str = "DBH";

/// Tree height, the first imputation target.
pub const HEIGHT: &str = "Height";

/// Crown width, imputed after height.
pub const CROWN_WIDTH: &str = "Crown Width";

/// Combined species label as exported by the inventory system.
pub const SPECIES: &str = "Species";

/// Common name split out of [`SPECIES`].
pub const FULL_NAME: &str = "Full Name";

/// Abbreviation split out of [`SPECIES`].
pub const ABBREVIATION: &str = "Abbreviation";

/// Scientific name split out of [`SPECIES`].
pub const SCIENTIFIC_NAME: &str = "Scientific Name";

/// Prefix shared by every temporary species feature column.
pub const SPECIES_FEATURE_PREFIX: &str = "__species";
