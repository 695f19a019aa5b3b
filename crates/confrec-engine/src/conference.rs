//! Conference boundary
//!
//! Conference and room membership live outside this crate. A session only
//! needs identity, member lookup and role lookup from its owning
//! conference.

use confrec_proto::{MemberAddress, MemberRole, RoomId};

/// A conference participant as seen by the recording session.
#[derive(Debug, Clone)]
pub struct ConferenceMember {
    /// Room address the participant acts under
    pub address: MemberAddress,

    /// Real contact address behind the room address
    pub contact_address: String,

    /// Current role in the room
    pub role: MemberRole,
}

/// View of the conference that owns a recording session.
pub trait ConferenceHandle: Send + Sync {
    /// Conference room identity; also the target room for status
    /// presence.
    fn room(&self) -> RoomId;

    /// Look up a member by room address.
    fn find_member(&self, address: &MemberAddress) -> Option<ConferenceMember>;

    /// Role of a member, `None` when the address is not in the room.
    fn role_for(&self, address: &MemberAddress) -> Option<MemberRole>;
}
