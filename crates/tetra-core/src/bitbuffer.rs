use std::fmt;

use crate::pdu_parse_error::PduParseErr;

/// Protocol layer whose payload start can be marked inside a BitBuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    L1 = 0,
    L2 = 1,
    L3 = 2,
    L4 = 3,
}

/// Unpacked bit buffer: every byte of the backing store holds a single bit (0 or 1).
///
/// The readable window spans `start..end` of the backing store. Protocol layers
/// record where their payload starts through layer markers, and the tail of the
/// window can be shrunk when fill bits or an FCS are stripped. Markers and the
/// read position are absolute offsets into the backing store.
#[derive(Clone)]
pub struct BitBuffer {
    bits: Vec<u8>,
    start: usize,       // bits before this are out of window
    pos: usize,         // next bit offset for read/write (absolute)
    end: usize,         // bits at or after this are out of window
    flag_autoexpand: bool,   // if true, writes past end grow the buffer
    layers: [Option<usize>; 4],
}

/// Interpret up to 64 unpacked bits as a big-endian unsigned integer
pub fn bits_to_uint(bits: &[u8]) -> u64 {
    debug_assert!(bits.len() <= 64);
    bits.iter().fold(0u64, |acc, &b| (acc << 1) | (b & 1) as u64)
}

impl BitBuffer {
    /// Create a zeroed buffer holding exactly `len_bits` bits.
    pub fn new(len_bits: usize) -> Self {
        BitBuffer {
            bits: vec![0; len_bits],
            start: 0,
            pos: 0,
            end: len_bits,
            flag_autoexpand: false,
            layers: [None; 4],
        }
    }

    /// Create an empty buffer with an initial capacity. Writes advance the end
    /// pointer and grow the backing store if needed.
    pub fn new_autoexpand(initial_capacity_bits: usize) -> Self {
        BitBuffer {
            bits: Vec::with_capacity(initial_capacity_bits),
            start: 0,
            pos: 0,
            end: 0,
            flag_autoexpand: true,
            layers: [None; 4],
        }
    }

    /// Build from a string of '0' and '1' characters. Other characters are skipped,
    /// so spaces may be used to group bits.
    pub fn from_bitstr(bitstr: &str) -> Self {
        let bits: Vec<u8> = bitstr
            .chars()
            .filter_map(|c| match c {
                '0' => Some(0),
                '1' => Some(1),
                _ => None,
            })
            .collect();
        Self::from_vec(bits)
    }

    /// Build from an unpacked bit array. Values are masked to their lowest bit.
    pub fn from_bitarr(data: &[u8]) -> Self {
        Self::from_vec(data.iter().map(|b| b & 1).collect())
    }

    fn from_vec(bits: Vec<u8>) -> Self {
        let end = bits.len();
        BitBuffer {
            bits,
            start: 0,
            pos: 0,
            end,
            flag_autoexpand: false,
            layers: [None; 4],
        }
    }

    /// Copy of the window of another buffer, from its start to its end. Position is reset.
    pub fn from_bitbuffer(other: &BitBuffer) -> Self {
        Self::from_vec(other.as_bits().to_vec())
    }

    /// Copy of another buffer from its current position to its end.
    pub fn from_bitbuffer_pos(other: &BitBuffer) -> Self {
        Self::from_vec(other.bits[other.pos..other.end].to_vec())
    }

    /// Copies the window into `buf`, which must be at least as long as the window.
    pub fn to_bitarr(&self, buf: &mut [u8]) {
        let len = self.get_len();
        assert!(buf.len() >= len, "to_bitarr: target too short ({} < {})", buf.len(), len);
        buf[..len].copy_from_slice(self.as_bits());
    }

    pub fn to_bitstr(&self) -> String {
        self.as_bits().iter().map(|&b| if b != 0 { '1' } else { '0' }).collect()
    }

    /// Window contents as an unpacked slice
    pub fn as_bits(&self) -> &[u8] {
        &self.bits[self.start..self.end]
    }

    pub fn as_bits_mut(&mut self) -> &mut [u8] {
        &mut self.bits[self.start..self.end]
    }

    /// Bits from the current position to the end of the window
    pub fn remaining_bits(&self) -> &[u8] {
        &self.bits[self.pos..self.end]
    }

    pub fn peek_bits(&self, num_bits: usize) -> Option<u64> {
        if num_bits > 64 || self.pos + num_bits > self.end {
            return None;
        }
        Some(bits_to_uint(&self.bits[self.pos..self.pos + num_bits]))
    }

    /// Peek at bits relative to the window start, independent of the read position
    pub fn peek_bits_startoffset(&self, offset: usize, num_bits: usize) -> Option<u64> {
        let from = self.start + offset;
        if num_bits > 64 || from + num_bits > self.end {
            return None;
        }
        Some(bits_to_uint(&self.bits[from..from + num_bits]))
    }

    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        let val = self.peek_bits(num_bits)?;
        self.pos += num_bits;
        Some(val)
    }

    /// Reads a field, mapping exhaustion of the buffer to a parse error naming the field
    pub fn read_field(&mut self, num_bits: usize, field: &'static str) -> Result<u64, PduParseErr> {
        self.read_bits(num_bits).ok_or(PduParseErr::BufferEnded { field: Some(field) })
    }

    pub fn read_bit(&mut self) -> Option<u8> {
        if self.pos >= self.end {
            return None;
        }
        let bit = self.bits[self.pos];
        self.pos += 1;
        Some(bit)
    }

    /// XOR one bit into the current position and advance
    pub fn xor_bit(&mut self, value: u8) {
        assert!(self.pos < self.end, "xor_bit: position beyond end");
        self.bits[self.pos] ^= value & 1;
        self.pos += 1;
    }

    /// XOR `data` into the window, starting `offset` bits after the window start.
    /// Returns None if the data would run past the end of the window.
    pub fn xor_bits_at(&mut self, offset: usize, data: &[u8]) -> Option<()> {
        let from = self.start + offset;
        if from + data.len() > self.end {
            return None;
        }
        for (dst, &src) in self.bits[from..from + data.len()].iter_mut().zip(data) {
            *dst ^= src & 1;
        }
        Some(())
    }

    pub fn write_bit(&mut self, value: u8) {
        if self.pos >= self.end {
            assert!(self.flag_autoexpand, "write_bit: buffer full");
            self.grow_to(self.pos + 1);
        }
        self.bits[self.pos] = value & 1;
        self.pos += 1;
    }

    /// Write the lowest `num_bits` of `value`, MSB first
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        assert!(num_bits <= 64);
        for i in (0..num_bits).rev() {
            self.write_bit(((value >> i) & 1) as u8);
        }
    }

    pub fn write_bitarr(&mut self, data: &[u8]) {
        for &b in data {
            self.write_bit(b);
        }
    }

    pub fn write_zeroes(&mut self, num_bits: usize) {
        for _ in 0..num_bits {
            self.write_bit(0);
        }
    }

    fn grow_to(&mut self, new_end: usize) {
        if self.bits.len() < new_end {
            self.bits.resize(new_end, 0);
        }
        self.end = new_end;
    }

    /// Length of the window
    pub fn get_len(&self) -> usize {
        self.end - self.start
    }

    pub fn get_len_remaining(&self) -> usize {
        self.end.saturating_sub(self.pos)
    }

    /// Read position relative to the window start
    pub fn get_pos(&self) -> usize {
        self.pos - self.start
    }

    /// Move the read position relative to the window start
    pub fn seek(&mut self, offset: usize) {
        assert!(self.start + offset <= self.end, "seek beyond end of window");
        self.pos = self.start + offset;
    }

    pub fn seek_rel(&mut self, offset: isize) {
        let new_pos = self.pos as isize + offset;
        assert!(
            new_pos >= self.start as isize && new_pos <= self.end as isize,
            "seek_rel outside of window"
        );
        self.pos = new_pos as usize;
    }

    pub fn get_raw_start(&self) -> usize {
        self.start
    }

    pub fn get_raw_end(&self) -> usize {
        self.end
    }

    pub fn get_raw_pos(&self) -> usize {
        self.pos
    }

    /// Moves the window start. Position is clamped into the new window.
    pub fn set_raw_start(&mut self, s: usize) {
        assert!(s <= self.end, "set_raw_start beyond end");
        self.start = s;
        if self.pos < s {
            self.pos = s;
        }
    }

    /// Moves the window end, which may not exceed the backing store.
    pub fn set_raw_end(&mut self, e: usize) {
        assert!(e >= self.start && e <= self.bits.len(), "set_raw_end outside backing store");
        self.end = e;
        if self.pos > e {
            self.pos = e;
        }
    }

    pub fn set_raw_pos(&mut self, p: usize) {
        assert!(p >= self.start && p <= self.end, "set_raw_pos outside window");
        self.pos = p;
    }

    /// Total bits available in the backing store, regardless of the window
    pub fn get_raw_capacity(&self) -> usize {
        self.bits.len()
    }

    /// Sets the window length, counted from the window start. Clamped to the backing store.
    pub fn set_len(&mut self, len: usize) {
        let e = (self.start + len).min(self.bits.len());
        self.set_raw_end(e);
    }

    /// Shrinks the window tail by `num_bits`
    pub fn truncate_tail(&mut self, num_bits: usize) {
        let e = self.end.saturating_sub(num_bits).max(self.start);
        self.set_raw_end(e);
    }

    /// Marks where a layer's payload starts, as an offset from the window start
    pub fn set_layer(&mut self, layer: Layer, offset: usize) {
        self.layers[layer as usize] = Some(self.start + offset);
    }

    pub fn clear_layer(&mut self, layer: Layer) {
        self.layers[layer as usize] = None;
    }

    pub fn clear_layers(&mut self) {
        self.layers = [None; 4];
    }

    /// Start of a layer relative to the window start
    pub fn layer_offset(&self, layer: Layer) -> Option<usize> {
        self.layers[layer as usize].map(|l| l.saturating_sub(self.start))
    }

    /// Bits from a layer marker to the window end, 0 if the layer is unset
    pub fn layer_len(&self, layer: Layer) -> usize {
        match self.layers[layer as usize] {
            Some(l) if l <= self.end => self.end - l,
            _ => 0,
        }
    }

    /// Slice from a layer marker to the window end
    pub fn layer_bits(&self, layer: Layer) -> &[u8] {
        match self.layers[layer as usize] {
            Some(l) if l <= self.end => &self.bits[l..self.end],
            _ => &[],
        }
    }

    /// Positions the read pointer at the start of a layer
    pub fn seek_layer(&mut self, layer: Layer) -> Option<()> {
        let l = self.layers[layer as usize]?;
        if l > self.end {
            return None;
        }
        self.pos = l;
        Some(())
    }

    pub fn dump_bin(&self) -> String {
        let mut s = String::with_capacity(self.get_len() + self.get_len() / 8);
        for (i, &b) in self.as_bits().iter().enumerate() {
            if i > 0 && i % 8 == 0 {
                s.push(' ');
            }
            s.push(if b != 0 { '1' } else { '0' });
        }
        s
    }

    /// Window contents packed MSB-first into hex
    pub fn dump_hex(&self) -> String {
        self.as_bits()
            .chunks(8)
            .map(|c| {
                let v = bits_to_uint(c) << (8 - c.len());
                format!("{:02x}", v)
            })
            .collect()
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BitBuffer {{ start: {}, pos: {}, end: {}, layers: {:?}, bits: {} }}",
            self.start,
            self.pos,
            self.end,
            self.layers,
            self.dump_bin()
        )
    }
}
