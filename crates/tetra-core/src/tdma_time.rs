use core::fmt;

/// Symbols per timeslot
pub const SYMBOLS_PER_SLOT: u32 = 255;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TdmaTime {
    /// Symbol number within the timeslot, from 1 to 255
    pub s: u8,
    /// Timeslot, from 1 to 4
    pub t: u8,
    /// Frame number, from 1 to 18
    pub f: u8,
    /// Multiframe number, from 1 to 60
    pub m: u8,
    /// Hyperframe number, from 0 to 0xFFFF
    pub h: u16,
}

impl Default for TdmaTime {
    /// Returns the default TdmaTime of 0/1/1/1, first symbol
    fn default() -> TdmaTime {
        TdmaTime { h: 0, m: 1, f: 1, t: 1, s: 1 }
    }
}

/// Value of i32 time where it wraps back to 0.
pub const TIME_INT_WRAP: i32 = 4 * 18 * 60 * 65536;

/// Difference between two int times, handling wrap-around of hyperframe number.
pub fn time_int_diff(a: i32, b: i32) -> i32 {
    let mut diff = a - b;
    while diff < -TIME_INT_WRAP / 2 {
        diff += TIME_INT_WRAP;
    }
    while diff >= TIME_INT_WRAP / 2 {
        diff -= TIME_INT_WRAP;
    }
    diff
}

impl TdmaTime {
    pub fn is_valid(self) -> bool {
        self.s >= 1 &&
        self.t >= 1 && self.t <= 4 &&
        self.f >= 1 && self.f <= 18 &&
        self.m >= 1 && self.m <= 60
    }

    /// Timeslot count since 0/1/1/1, ignoring the symbol number
    pub fn to_int(self) -> i32 {
        (self.t as i32 - 1) +
        ((self.f as i32 - 1) * 4) +
        ((self.m as i32 - 1) * 4 * 18) +
        (self.h as i32 * 4 * 18 * 60)
    }

    /// Converts a i32 timeslot count into a TdmaTime at the first symbol,
    /// wrapping the hyperframe number at 65536
    pub fn from_int(time: i32) -> TdmaTime {
        let t = (time.rem_euclid(4) + 1) as u8;
        let f = (time.div_euclid(4).rem_euclid(18) + 1) as u8;
        let m = (time.div_euclid(4 * 18).rem_euclid(60) + 1) as u8;
        let h = time.div_euclid(4 * 18 * 60).rem_euclid(65536) as u16;
        TdmaTime { t, f, m, h, s: 1 }
    }

    /// Add a number of timeslots, keeping the symbol number
    pub fn add_timeslots(self, num_slots: i32) -> TdmaTime {
        let mut r = TdmaTime::from_int(self.to_int().wrapping_add(num_slots).rem_euclid(TIME_INT_WRAP));
        r.s = self.s;
        r
    }

    /// Add a number of frames, keeping timeslot and symbol numbers
    pub fn add_frames(self, num_frames: i32) -> TdmaTime {
        self.add_timeslots(num_frames * 4)
    }

    /// Add a number of symbols. Overflow past symbol 255 carries into the timeslot number.
    pub fn add_symbols(self, num_syms: u32) -> TdmaTime {
        let idx = (self.s as u32 - 1) + num_syms;
        let carry = idx / SYMBOLS_PER_SLOT;
        let mut r = self.add_timeslots(carry as i32);
        r.s = (idx % SYMBOLS_PER_SLOT + 1) as u8;
        r
    }

    /// Difference between two TdmaTimes in timeslots
    pub fn diff(self, b: Self) -> i32 {
        time_int_diff(self.to_int(), b.to_int())
    }

    /// Age of this TdmaTime compared to now
    #[inline(always)]
    pub fn age(self, now: TdmaTime) -> i32 {
        now.diff(self)
    }

    /// Absolute frame number, (hn * 60 + mn) * 18 + fn
    pub fn to_frame_number(self) -> u32 {
        ((self.h as u32 * 60) + self.m as u32) * 18 + self.f as u32
    }

    /// Returns true if this DL timeslot should contain a mandatory BSCH (SYNC) block
    pub fn is_mandatory_bsch(&self) -> bool {
        self.f == 18 && self.t == 4 - ((self.m + 1) % 4)
    }

    /// Returns true if this DL timeslot should contain a mandatory BNCH (broadcast) block
    pub fn is_mandatory_bnch(&self) -> bool {
        self.f == 18 && self.t == 4 - ((self.m + 3) % 4)
    }
}

impl fmt::Display for TdmaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{}/{:03}", self.m, self.f, self.t, self.s)
    }
}

impl fmt::Debug for TdmaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:5}/{:02}/{:02}/{}/{:03}", self.h, self.m, self.f, self.t, self.s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_timeslots_and_diff() {
        let initial_time = TdmaTime::default();

        let mut time = initial_time;
        // Repeat add_timeslots enough times that hyperframe number wraps
        let iterations = 100000;
        let increment = 12345;
        for _ in 0..iterations {
            let time2 = time.add_timeslots(increment);
            assert_eq!(time2.diff(time), increment);
            assert_eq!(time.diff(time2), -increment);
            time = time2;
        }

        for _ in 0..iterations {
            let time2 = time.add_timeslots(-increment);
            assert_eq!(time2.diff(time), -increment);
            assert_eq!(time.diff(time2), increment);
            time = time2;
        }

        assert_eq!(time, initial_time);
    }

    #[test]
    fn test_from_int() {
        assert_eq!(TdmaTime::from_int(0), TdmaTime { t: 1, f: 1, m: 1, h: 0, s: 1 });
        assert_eq!(TdmaTime::from_int(1), TdmaTime { t: 2, f: 1, m: 1, h: 0, s: 1 });
        assert_eq!(TdmaTime::from_int(-1), TdmaTime { t: 4, f: 18, m: 60, h: 65535, s: 1 });
        for time_int in -10000..10000 {
            assert_eq!(TdmaTime::from_int(time_int).diff(TdmaTime::from_int(0)), time_int);
        }
    }

    #[test]
    fn test_four_slots_is_one_frame() {
        let base = TdmaTime { h: 7, m: 33, f: 17, t: 3, s: 40 };
        assert_eq!(base.add_timeslots(4), base.add_frames(1));
        assert_eq!(base.add_timeslots(4).f, 18);
        assert_eq!(base.add_timeslots(8).f, 1);
        assert_eq!(base.add_timeslots(8).m, 34);
    }

    #[test]
    fn test_eighteen_frames_is_one_multiframe() {
        let base = TdmaTime { h: 0, m: 60, f: 5, t: 2, s: 1 };
        let next = base.add_frames(18);
        assert_eq!((next.h, next.m, next.f, next.t), (1, 1, 5, 2));
    }

    #[test]
    fn test_symbol_wrap() {
        let base = TdmaTime { h: 0, m: 1, f: 1, t: 4, s: 250 };
        let r = base.add_symbols(5);
        assert_eq!((r.t, r.s), (4, 255));
        let r = base.add_symbols(6);
        assert_eq!((r.f, r.t, r.s), (2, 1, 1));
        let r = base.add_symbols(6 + 255);
        assert_eq!((r.f, r.t, r.s), (2, 2, 1));
    }

    #[test]
    fn test_frame_number_and_dump() {
        let t = TdmaTime { h: 2, m: 3, f: 4, t: 1, s: 9 };
        assert_eq!(t.to_frame_number(), (2 * 60 + 3) * 18 + 4);
        assert_eq!(format!("{}", t), "03/04/1/009");
    }

    #[test]
    fn test_mandatory_broadcast_slots() {
        // mn 1: BNCH on tn 4, BSCH on tn 2
        let t = TdmaTime { h: 0, m: 1, f: 18, t: 4, s: 1 };
        assert!(t.is_mandatory_bnch());
        assert!(!t.is_mandatory_bsch());
        let t = TdmaTime { t: 2, ..t };
        assert!(t.is_mandatory_bsch());
    }
}
