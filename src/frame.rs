//! Fixed size command and response frames.

/// Every report sent to or received from the PSU is exactly this long.
pub const FRAME_LEN: usize = 64;

/// Offset of the first payload byte in a response.
pub const PAYLOAD_OFFSET: usize = 2;

/// Largest payload a single response can carry.
pub const MAX_PAYLOAD: usize = FRAME_LEN - PAYLOAD_OFFSET;

/// One 64 byte report.
///
/// Requests carry `[address, opcode, opdata, 0...]`. Responses echo the opcode at
/// offset 1 and carry their payload from offset 2.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// A zero filled frame.
    pub const fn zeroed() -> Self {
        Self([0u8; FRAME_LEN])
    }

    /// Build a request frame.
    pub fn command(address: u8, opcode: u8, opdata: u8) -> Self {
        let mut frame = Self::zeroed();
        frame.0[0] = address;
        frame.0[1] = opcode;
        frame.0[2] = opdata;
        frame
    }

    pub fn address(&self) -> u8 {
        self.0[0]
    }

    /// Opcode of a request, or the opcode echoed by a response.
    pub fn opcode(&self) -> u8 {
        self.0[1]
    }

    /// Payload bytes starting at [`PAYLOAD_OFFSET`]. `width` is clamped to [`MAX_PAYLOAD`].
    pub fn payload(&self, width: usize) -> &[u8] {
        let end = PAYLOAD_OFFSET + width.min(MAX_PAYLOAD);
        &self.0[PAYLOAD_OFFSET..end]
    }

    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(value: [u8; FRAME_LEN]) -> Self {
        Self(value)
    }
}

impl core::fmt::Debug for Frame {
    // Trailing zeros are noise in logs.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let used = self.0.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        let shown = used.max(PAYLOAD_OFFSET + 1);
        write!(f, "Frame({:02x?}", &self.0[..shown])?;
        if shown < FRAME_LEN {
            write!(f, " +{} zero", FRAME_LEN - shown)?;
        }
        write!(f, ")")
    }
}
