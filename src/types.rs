/// User identifier as it appears in a feedback file.
/// Example: `A2B7BUH8834Y6M`
pub type UserId = String;
/// Item identifier shared across every modality of a dataset.
/// Example: `B0000C321X`
pub type ItemId = String;
/// Explicit feedback value, typically on a 1-5 scale.
/// Examples: `5.0`, `3.0`
pub type Rating = f64;
/// Interaction weight carried by graph edges.
/// Example: `1.0`
pub type EdgeWeight = f64;
/// Raw document text attached to an item.
/// Example: `red cotton shirt with short sleeves`
pub type Document = String;
/// Remote location of a cached resource.
/// Example: `https://static.preferred.ai/cornac/datasets/amazon_clothing/rating.zip`
pub type Url = String;
/// Registered dataset name.
/// Examples: `amazon_clothing`, `tradesy`
pub type DatasetName = String;
/// Cache-relative storage path, always `/`-separated.
/// Example: `amazon_clothing/rating.txt`
pub type RelativePath = String;
