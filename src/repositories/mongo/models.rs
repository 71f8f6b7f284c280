/// Stored shape of a document. Field values live under `data`; the metadata
/// keeps fixed-width timestamps so that string order is time order.
#[derive(Debug, Clone, ::serde::Serialize, ::serde::Deserialize)]
pub struct MongoDocumentModel {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
    pub data: ::mongodb::bson::Document,
}
