//! Yo-Yo Intermittent Recovery Test Level 1 protocol.
//!
//! 2 x 20 m shuttles with a 10 s recovery window between them. Times are
//! seconds from the start of the test, distances are cumulative metres.

use serde::{Deserialize, Serialize};

use crate::clock::{Span, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShuttleInfo {
    pub level: u32,
    /// Repetition within the level.
    pub shuttle: u32,
    /// km/h
    pub speed: f64,
    pub start_time: f64,
    pub end_time: f64,
    /// Cumulative metres once this shuttle is completed.
    pub distance: u32,
}

impl ShuttleInfo {
    pub fn span(&self) -> Span {
        Span {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Moment of the turn signal, half way through the run.
    pub fn turn_time(&self) -> f64 {
        self.span().midpoint()
    }

    /// "Level L - Shuttle S (V km/h)"
    pub fn label(&self) -> String {
        format!(
            "Level {} - Shuttle {} ({} km/h)",
            self.level, self.shuttle, self.speed
        )
    }
}

const fn shuttle(
    level: u32,
    shuttle: u32,
    speed: f64,
    start_time: f64,
    end_time: f64,
    distance: u32,
) -> ShuttleInfo {
    ShuttleInfo {
        level,
        shuttle,
        speed,
        start_time,
        end_time,
        distance,
    }
}

pub static YOYO_IR1_PROTOCOL: [ShuttleInfo; 91] = [
    shuttle(5, 1, 10.0, 0.0, 14.4, 40),
    shuttle(9, 1, 11.5, 24.4, 36.92, 80),
    shuttle(11, 1, 12.0, 46.92, 58.92, 120),
    shuttle(11, 2, 12.0, 68.92, 80.92, 160),
    shuttle(12, 1, 12.5, 90.92, 102.44, 200),
    shuttle(12, 2, 12.5, 112.44, 123.96, 240),
    shuttle(12, 3, 12.5, 133.96, 145.48, 280),
    shuttle(13, 1, 13.0, 155.48, 166.56, 320),
    shuttle(13, 2, 13.0, 176.56, 187.64, 360),
    shuttle(13, 3, 13.0, 197.64, 208.72, 400),
    shuttle(13, 4, 13.0, 218.72, 229.8, 440),
    shuttle(14, 1, 13.5, 239.8, 250.33, 480),
    shuttle(14, 2, 13.5, 260.33, 270.86, 520),
    shuttle(14, 3, 13.5, 280.86, 291.39, 560),
    shuttle(14, 4, 13.5, 301.39, 311.92, 600),
    shuttle(14, 5, 13.5, 321.92, 332.45, 640),
    shuttle(14, 6, 13.5, 342.45, 352.98, 680),
    shuttle(14, 7, 13.5, 362.98, 373.51, 720),
    shuttle(14, 8, 13.5, 383.51, 394.04, 760),
    shuttle(15, 1, 14.0, 404.04, 414.33, 800),
    shuttle(15, 2, 14.0, 424.33, 434.62, 840),
    shuttle(15, 3, 14.0, 444.62, 454.91, 880),
    shuttle(15, 4, 14.0, 464.91, 475.2, 920),
    shuttle(15, 5, 14.0, 485.2, 495.49, 960),
    shuttle(15, 6, 14.0, 505.49, 515.78, 1000),
    shuttle(15, 7, 14.0, 525.78, 536.07, 1040),
    shuttle(15, 8, 14.0, 546.07, 556.36, 1080),
    shuttle(16, 1, 14.5, 566.36, 576.24, 1120),
    shuttle(16, 2, 14.5, 586.24, 596.12, 1160),
    shuttle(16, 3, 14.5, 606.12, 616.0, 1200),
    shuttle(16, 4, 14.5, 626.0, 635.88, 1240),
    shuttle(16, 5, 14.5, 645.88, 655.76, 1280),
    shuttle(16, 6, 14.5, 665.76, 675.64, 1320),
    shuttle(16, 7, 14.5, 685.64, 695.52, 1360),
    shuttle(16, 8, 14.5, 705.52, 715.4, 1400),
    shuttle(17, 1, 15.0, 725.4, 735.0, 1440),
    shuttle(17, 2, 15.0, 745.0, 754.6, 1480),
    shuttle(17, 3, 15.0, 764.6, 774.2, 1520),
    shuttle(17, 4, 15.0, 784.2, 793.8, 1560),
    shuttle(17, 5, 15.0, 803.8, 813.4, 1600),
    shuttle(17, 6, 15.0, 823.4, 833.0, 1640),
    shuttle(17, 7, 15.0, 843.0, 852.6, 1680),
    shuttle(17, 8, 15.0, 862.6, 872.2, 1720),
    shuttle(18, 1, 15.5, 882.2, 891.47, 1760),
    shuttle(18, 2, 15.5, 901.47, 910.74, 1800),
    shuttle(18, 3, 15.5, 920.74, 930.01, 1840),
    shuttle(18, 4, 15.5, 940.01, 949.28, 1880),
    shuttle(18, 5, 15.5, 959.28, 968.55, 1920),
    shuttle(18, 6, 15.5, 978.55, 987.82, 1960),
    shuttle(18, 7, 15.5, 997.82, 1007.09, 2000),
    shuttle(18, 8, 15.5, 1017.09, 1026.36, 2040),
    shuttle(19, 1, 16.0, 1036.36, 1045.36, 2080),
    shuttle(19, 2, 16.0, 1055.36, 1064.36, 2120),
    shuttle(19, 3, 16.0, 1074.36, 1083.36, 2160),
    shuttle(19, 4, 16.0, 1093.36, 1102.36, 2200),
    shuttle(19, 5, 16.0, 1112.36, 1121.36, 2240),
    shuttle(19, 6, 16.0, 1131.36, 1140.36, 2280),
    shuttle(19, 7, 16.0, 1150.36, 1159.36, 2320),
    shuttle(19, 8, 16.0, 1169.36, 1178.36, 2360),
    shuttle(20, 1, 16.5, 1188.36, 1197.05, 2400),
    shuttle(20, 2, 16.5, 1207.05, 1215.74, 2440),
    shuttle(20, 3, 16.5, 1225.74, 1234.43, 2480),
    shuttle(20, 4, 16.5, 1244.43, 1253.12, 2520),
    shuttle(20, 5, 16.5, 1263.12, 1271.81, 2560),
    shuttle(20, 6, 16.5, 1281.81, 1290.5, 2600),
    shuttle(20, 7, 16.5, 1300.5, 1309.19, 2640),
    shuttle(20, 8, 16.5, 1319.19, 1327.88, 2680),
    shuttle(21, 1, 17.0, 1337.88, 1346.36, 2720),
    shuttle(21, 2, 17.0, 1356.36, 1364.84, 2760),
    shuttle(21, 3, 17.0, 1374.84, 1383.32, 2800),
    shuttle(21, 4, 17.0, 1393.32, 1401.8, 2840),
    shuttle(21, 5, 17.0, 1411.8, 1420.28, 2880),
    shuttle(21, 6, 17.0, 1430.28, 1438.76, 2920),
    shuttle(21, 7, 17.0, 1448.76, 1457.24, 2960),
    shuttle(21, 8, 17.0, 1467.24, 1475.72, 3000),
    shuttle(22, 1, 17.5, 1485.72, 1493.9, 3040),
    shuttle(22, 2, 17.5, 1503.9, 1512.08, 3080),
    shuttle(22, 3, 17.5, 1522.08, 1530.26, 3120),
    shuttle(22, 4, 17.5, 1540.26, 1548.44, 3160),
    shuttle(22, 5, 17.5, 1558.44, 1566.62, 3200),
    shuttle(22, 6, 17.5, 1576.62, 1584.8, 3240),
    shuttle(22, 7, 17.5, 1594.8, 1602.98, 3280),
    shuttle(22, 8, 17.5, 1612.98, 1621.16, 3320),
    shuttle(23, 1, 18.0, 1631.16, 1639.16, 3360),
    shuttle(23, 2, 18.0, 1649.16, 1657.16, 3400),
    shuttle(23, 3, 18.0, 1667.16, 1675.16, 3440),
    shuttle(23, 4, 18.0, 1685.16, 1693.16, 3480),
    shuttle(23, 5, 18.0, 1703.16, 1711.16, 3520),
    shuttle(23, 6, 18.0, 1721.16, 1729.16, 3560),
    shuttle(23, 7, 18.0, 1739.16, 1747.16, 3600),
    shuttle(23, 8, 18.0, 1757.16, 1765.16, 3640),
];

/// The shuttle table as a [`Timeline`].
#[derive(Debug, Clone, Copy)]
pub struct ShuttleTable {
    shuttles: &'static [ShuttleInfo],
}

impl Default for ShuttleTable {
    fn default() -> Self {
        Self::ir1()
    }
}

impl ShuttleTable {
    pub fn ir1() -> Self {
        Self {
            shuttles: &YOYO_IR1_PROTOCOL,
        }
    }

    pub fn shuttles(&self) -> &'static [ShuttleInfo] {
        self.shuttles
    }

    pub fn get(&self, index: usize) -> Option<&'static ShuttleInfo> {
        self.shuttles.get(index)
    }

    pub fn last(&self) -> Option<&'static ShuttleInfo> {
        self.shuttles.last()
    }

    /// Index of the shuttle in progress at `t`, or of the most recently
    /// completed one during recovery. `None` before the first start.
    pub fn current_index(&self, t: f64) -> Option<usize> {
        self.segment_covering(t)
            .or_else(|| self.last_ended_before(t))
    }

    pub fn current(&self, t: f64) -> Option<&'static ShuttleInfo> {
        self.current_index(t).and_then(|i| self.get(i))
    }

    /// First shuttle that has not started yet at `t`.
    pub fn next_index(&self, t: f64) -> Option<usize> {
        self.first_starting_after(t)
    }

    pub fn next(&self, t: f64) -> Option<&'static ShuttleInfo> {
        self.next_index(t).and_then(|i| self.get(i))
    }

    /// Cumulative distance after shuttle `index`. Negative indices mean no
    /// completed shuttle; indices past the end clamp to the final distance.
    pub fn estimated_distance(&self, index: i64) -> u32 {
        if index < 0 {
            return 0;
        }
        self.shuttles
            .get(index as usize)
            .or(self.shuttles.last())
            .map(|s| s.distance)
            .unwrap_or(0)
    }
}

impl Timeline for ShuttleTable {
    fn len(&self) -> usize {
        self.shuttles.len()
    }

    fn span(&self, index: usize) -> Option<Span> {
        self.shuttles.get(index).map(ShuttleInfo::span)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_monotonic_with_recovery_gaps() {
        for pair in YOYO_IR1_PROTOCOL.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.start_time < a.end_time);
            assert!(b.start_time > a.end_time, "no recovery before {:?}", b);
            assert!(b.distance > a.distance);
        }
        assert_eq!(YOYO_IR1_PROTOCOL[0].distance, 40);
        assert_eq!(YOYO_IR1_PROTOCOL[90].distance, 3640);
    }

    #[test]
    fn current_covers_run_then_recovery() {
        let table = ShuttleTable::ir1();
        assert_eq!(table.current_index(0.0), Some(0));
        assert_eq!(table.current_index(14.4), Some(0));
        // recovery window keeps the completed shuttle current
        assert_eq!(table.current_index(20.0), Some(0));
        assert_eq!(table.next_index(20.0), Some(1));
        assert_eq!(table.current_index(24.4), Some(1));
        assert_eq!(table.current_index(5_000.0), Some(90));
        assert_eq!(table.next_index(5_000.0), None);
    }

    #[test]
    fn next_is_strictly_after() {
        let table = ShuttleTable::ir1();
        assert_eq!(table.next_index(0.0), Some(1));
        assert_eq!(table.next(24.39).map(|s| s.level), Some(9));
    }

    #[test]
    fn estimated_distance_clamps() {
        let table = ShuttleTable::ir1();
        assert_eq!(table.estimated_distance(-1), 0);
        assert_eq!(table.estimated_distance(4), 200);
        assert_eq!(table.estimated_distance(10_000), 3640);
    }

    #[test]
    fn label_formats_level_and_speed() {
        assert_eq!(
            YOYO_IR1_PROTOCOL[1].label(),
            "Level 9 - Shuttle 1 (11.5 km/h)"
        );
        assert_eq!(YOYO_IR1_PROTOCOL[0].label(), "Level 5 - Shuttle 1 (10 km/h)");
    }
}
