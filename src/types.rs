/// A given name as stored (case preserved).
/// Examples: `Anna`, `Борис`, `Ξένια`
pub type Name = String;
/// Store-assigned identity of a name row.
pub type NameId = u64;
/// Store-assigned identity of a category row.
pub type CategoryId = u64;
/// Resolved BCP-47 language tag.
/// Examples: `en`, `fr`, `grc`
pub type LanguageTag = String;
/// Field key inside a fact record or fact set.
/// Examples: `cat.lang`, `given-name.from`, `is_short_for`, `gender_flag`
pub type FieldKey = String;
/// Identifier for a nickname source.
/// Examples: `brianary`, `hajongler`
pub type SourceId = String;
/// Raw wiki category title.
/// Example: `Category:French male given names from Latin`
pub type CategoryName = String;
/// Diagnostic tally key.
/// Examples: `Old Frisian`, `categories`
pub type TallyKey = String;
