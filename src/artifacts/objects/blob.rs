use bytes::Bytes;
use derive_new::new;

/// Opaque file content. No structure is imposed on the bytes.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    data: Bytes,
}

impl Blob {
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn serialize_payload(&self) -> Bytes {
        self.data.clone()
    }

    pub fn deserialize_payload(payload: Bytes) -> Self {
        Blob { data: payload }
    }
}
