//! `HitStats` — column-oriented storage for the hits of one module.
//!
//! # Layout
//!
//! One `Vec` per [`HitRecord`] field, all of identical length.  Index `i`
//! across every column is the same logical hit:
//!
//! ```ignore
//! let t = stats.hit_time[i];
//! let s = stats.sensor[i];   // same photon
//! ```
//!
//! Hits are appended one at a time during simulation and consumed in bulk
//! (sorted, counted, dumped column-wise), so columns avoid per-hit allocation
//! and match the columnar output format downstream.  Use [`HitStats::records`]
//! when a row view is more convenient.
//!
//! # Invariant
//!
//! All columns always have equal length.  The fields are `pub` for cheap
//! columnar reads; code that mutates them must keep the lengths in step (use
//! [`HitStats::visit_columns_mut`] to touch every column at once).

use crate::{HitError, HitRecord, HitResult, PulseResponse, SensorId, Vec3};

/// Generates the column list once so no operation can forget a column.
macro_rules! for_each_column {
    ($m:ident!($($args:tt)*)) => {
        $m!($($args)*;
            event_id,
            hit_time,
            flight_time,
            path_length,
            energy,
            sensor,
            direction,
            local_position,
            global_position,
            generation_distance,
            response
        )
    };
}

/// Visitor over every column of a [`HitStats`], used for whole-row
/// transforms such as permutations.
pub trait ColumnVisitor {
    fn visit<T>(&mut self, name: &'static str, column: &mut Vec<T>);
}

/// Hits of one module, stored as parallel columns.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HitStats {
    pub event_id:            Vec<u64>,
    pub hit_time:            Vec<f64>,
    pub flight_time:         Vec<f64>,
    pub path_length:         Vec<f64>,
    pub energy:              Vec<f64>,
    pub sensor:              Vec<SensorId>,
    pub direction:           Vec<Vec3>,
    pub local_position:      Vec<Vec3>,
    pub global_position:     Vec<Vec3>,
    pub generation_distance: Vec<f64>,
    pub response:            Vec<PulseResponse>,
}

impl HitStats {
    /// An empty container.  `const` so callers can keep a shared static
    /// empty instance for "no data yet" lookups.
    pub const fn new() -> Self {
        Self {
            event_id:            Vec::new(),
            hit_time:            Vec::new(),
            flight_time:         Vec::new(),
            path_length:         Vec::new(),
            energy:              Vec::new(),
            sensor:              Vec::new(),
            direction:           Vec::new(),
            local_position:      Vec::new(),
            global_position:     Vec::new(),
            generation_distance: Vec::new(),
            response:            Vec::new(),
        }
    }

    /// Number of hits.
    #[inline]
    pub fn len(&self) -> usize {
        self.hit_time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hit_time.is_empty()
    }

    /// Append one hit, one value per column.
    pub fn push(&mut self, record: HitRecord) {
        macro_rules! push_all {
            ($rec:ident; $($col:ident),+) => { $( self.$col.push($rec.$col); )+ };
        }
        for_each_column!(push_all!(record));
    }

    /// Row `i` as a [`HitRecord`], or `None` if out of range.
    pub fn get(&self, i: usize) -> Option<HitRecord> {
        (i < self.len()).then(|| self.row(i))
    }

    /// Row view over all hits in storage order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = HitRecord> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Move every hit of `other` onto the end of `self`, column by column.
    /// `other` is left empty.
    pub fn append(&mut self, other: &mut HitStats) {
        macro_rules! append_all {
            ($other:ident; $($col:ident),+) => { $( self.$col.append(&mut $other.$col); )+ };
        }
        for_each_column!(append_all!(other));
    }

    /// Drop every hit.  Capacity is kept.
    pub fn clear(&mut self) {
        macro_rules! clear_all {
            (; $($col:ident),+) => { $( self.$col.clear(); )+ };
        }
        for_each_column!(clear_all!());
    }

    /// Hand every column to `visitor`, in declaration order.
    pub fn visit_columns_mut<V: ColumnVisitor>(&mut self, visitor: &mut V) {
        macro_rules! visit_all {
            ($v:ident; $($col:ident),+) => { $( $v.visit(stringify!($col), &mut self.$col); )+ };
        }
        for_each_column!(visit_all!(visitor));
    }

    /// Verify that every column has the same length as `hit_time`.
    pub fn check_columns(&self) -> HitResult<()> {
        let expected = self.len();
        macro_rules! check_all {
            (; $($col:ident),+) => {
                $(
                    if self.$col.len() != expected {
                        return Err(HitError::ColumnLengthMismatch {
                            expected,
                            got:  self.$col.len(),
                            what: stringify!($col),
                        });
                    }
                )+
            };
        }
        for_each_column!(check_all!());
        Ok(())
    }

    fn row(&self, i: usize) -> HitRecord {
        macro_rules! build {
            ($i:ident; $($col:ident),+) => { HitRecord { $( $col: self.$col[$i], )+ } };
        }
        for_each_column!(build!(i))
    }

    /// `true` if `hit_time` is non-decreasing.
    pub fn is_time_sorted(&self) -> bool {
        self.hit_time.windows(2).all(|w| w[0] <= w[1])
    }
}

impl FromIterator<HitRecord> for HitStats {
    fn from_iter<I: IntoIterator<Item = HitRecord>>(iter: I) -> Self {
        let mut stats = HitStats::new();
        stats.extend(iter);
        stats
    }
}

impl Extend<HitRecord> for HitStats {
    fn extend<I: IntoIterator<Item = HitRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}
