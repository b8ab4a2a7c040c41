//! sysmouse packet decoding.
//!
//! ```text
//! byte 0   0x80 | inverted buttons (bit set = up): 0x04 left, 0x02 middle, 0x01 right
//! byte 1   ΔX part 1 ┐
//! byte 2   ΔY part 1 │ two's complement, ΔX = b1 + b3, ΔY = -(b2 + b4)
//! byte 3   ΔX part 2 │
//! byte 4   ΔY part 2 ┘
//! byte 5   ΔZ part 1 ┐ extended level only, 7-bit two's complement
//! byte 6   ΔZ part 2 ┘
//! byte 7   extra buttons (ignored)
//! ```
//!
//! Packets are integrated into an absolute position which is clamped to the
//! screen bounds once per burst.

use std::io::Read;

use super::events::{EventSink, InputEvent, MouseButtons, PointerEvent};
use super::reader::{self, ReadStatus};
use crate::config::MouseConfig;
use crate::error::DeviceError;

const BUTTON1_UP: u8 = 0x04;
const BUTTON2_UP: u8 = 0x02;
const BUTTON3_UP: u8 = 0x01;
const STD_BUTTONS: u8 = 0x07;

// =============================================================================
// Packet level
// =============================================================================

/// Reporting level of the device, fixing the packet size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketLevel {
    /// Level 0: 5-byte packets.
    Basic,
    /// Level 1: 8-byte packets with wheel data.
    Extended,
}

impl PacketLevel {
    pub fn from_level(level: i32) -> Result<Self, DeviceError> {
        match level {
            0 => Ok(Self::Basic),
            1 => Ok(Self::Extended),
            other => Err(DeviceError::UnsupportedLevel(other)),
        }
    }

    pub fn packet_size(self) -> usize {
        match self {
            Self::Basic => 5,
            Self::Extended => 8,
        }
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// Screen rectangle the pointer is confined to. Edges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width.max(1) - 1)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height.max(1) - 1)
    }

    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        (x.clamp(self.left, self.right()), y.clamp(self.top, self.bottom()))
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0, 0, 1024, 768)
    }
}

// =============================================================================
// Decoder
// =============================================================================

/// One decoded packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Packet {
    pub dx: i32,
    pub dy: i32,
    pub wheel: i32,
    pub buttons: MouseButtons,
}

impl Packet {
    /// Decode a complete packet. Returns `None` for a short slice.
    pub fn parse(bytes: &[u8], level: PacketLevel) -> Option<Self> {
        if bytes.len() < level.packet_size() {
            return None;
        }
        let s = |i: usize| i32::from(bytes[i] as i8);

        let status = bytes[0] & STD_BUTTONS;
        let mut buttons = MouseButtons::empty();
        buttons.set(MouseButtons::LEFT, status & BUTTON1_UP == 0);
        buttons.set(MouseButtons::MIDDLE, status & BUTTON2_UP == 0);
        buttons.set(MouseButtons::RIGHT, status & BUTTON3_UP == 0);

        let wheel = match level {
            PacketLevel::Basic => 0,
            PacketLevel::Extended => sext7(bytes[5]) + sext7(bytes[6]),
        };

        Some(Self {
            dx: s(1) + s(3),
            dy: -(s(2) + s(4)),
            wheel,
            buttons,
        })
    }
}

fn sext7(b: u8) -> i32 {
    i32::from(((b << 1) as i8) >> 1)
}

/// Position integrator.
#[derive(Debug, Clone)]
pub struct MouseDecoder {
    level: PacketLevel,
    bounds: Bounds,
    x: i32,
    y: i32,
    buttons: MouseButtons,
    wheel: i32,
    packets: usize,
}

impl MouseDecoder {
    /// Start at the top-left corner of `bounds` with no buttons held.
    pub fn new(level: PacketLevel, bounds: Bounds) -> Self {
        Self {
            level,
            bounds,
            x: bounds.left,
            y: bounds.top,
            buttons: MouseButtons::empty(),
            wheel: 0,
            packets: 0,
        }
    }

    pub fn level(&self) -> PacketLevel {
        self.level
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        (self.x, self.y) = bounds.clamp(self.x, self.y);
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Accumulate one packet. Incomplete packets are ignored.
    pub fn decode(&mut self, bytes: &[u8]) -> bool {
        let Some(p) = Packet::parse(bytes, self.level) else {
            log::trace!("[console-input] dropping partial mouse packet ({} bytes)", bytes.len());
            return false;
        };
        self.x = self.x.saturating_add(p.dx);
        self.y = self.y.saturating_add(p.dy);
        self.wheel += p.wheel;
        self.buttons = p.buttons;
        self.packets += 1;
        true
    }

    /// Close the burst: clamp and report, if any packet arrived.
    pub fn finish_burst(&mut self) -> Option<PointerEvent> {
        if self.packets == 0 {
            return None;
        }
        (self.x, self.y) = self.bounds.clamp(self.x, self.y);
        let event = PointerEvent {
            x: self.x,
            y: self.y,
            buttons: self.buttons,
            wheel: self.wheel,
        };
        self.packets = 0;
        self.wheel = 0;
        Some(event)
    }

    /// Decode every complete packet in `bytes` as one burst.
    pub fn decode_burst(&mut self, bytes: &[u8]) -> Option<PointerEvent> {
        for packet in bytes.chunks(self.level.packet_size()) {
            self.decode(packet);
        }
        self.finish_burst()
    }
}

// =============================================================================
// Handler
// =============================================================================

/// Mouse handler: drains packets and delivers one pointer event per burst.
pub struct MouseHandler<S: EventSink> {
    decoder: Option<MouseDecoder>,
    sink: S,
}

impl<S: EventSink> MouseHandler<S> {
    pub fn new(level: PacketLevel, bounds: Bounds, sink: S) -> Self {
        log::debug!("[console-input] mouse packet size {}", level.packet_size());
        Self {
            decoder: Some(MouseDecoder::new(level, bounds)),
            sink,
        }
    }

    /// Handler for a raw device level. An unsupported level gives an
    /// inactive handler that decodes nothing.
    pub fn for_level(level: i32, bounds: Bounds, sink: S) -> Self {
        match PacketLevel::from_level(level) {
            Ok(level) => Self::new(level, bounds, sink),
            Err(e) => {
                log::warn!("[console-input] mouse disabled: {}", e);
                Self { decoder: None, sink }
            }
        }
    }

    pub fn from_config(config: &MouseConfig, level: PacketLevel, sink: S) -> Self {
        Self::new(level, config.bounds, sink)
    }

    pub fn is_active(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn decoder(&self) -> Option<&MouseDecoder> {
        self.decoder.as_ref()
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        if let Some(decoder) = &mut self.decoder {
            decoder.set_bounds(bounds);
        }
    }

    /// Read packets until a short read or no data, then report once.
    pub fn read_available(&mut self, source: &mut impl Read) -> ReadStatus {
        let Some(decoder) = &mut self.decoder else {
            return ReadStatus::Drained;
        };
        let size = decoder.level().packet_size();
        let status = reader::drain(source, size, true, |packet| {
            decoder.decode(packet);
        });
        if let Some(event) = decoder.finish_burst() {
            self.sink.deliver(InputEvent::Pointer(event));
        }
        status
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}
