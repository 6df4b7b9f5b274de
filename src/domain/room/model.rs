/// Meeting room metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingRoom {
    pub id: String,
    pub name: String,
    /// Maximum number of attendees
    pub capacity: u32,
}

impl MeetingRoom {
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
        }
    }

    pub fn fits(&self, attendees: u32) -> bool {
        attendees <= self.capacity
    }
}
