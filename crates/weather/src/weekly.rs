//! Seven-day forecast for the survey area, bucketed at 06, 09, 12, 15, 18
//! and 21 h. Speeds in km/h, directions as the compass point the wind comes
//! from.

use crate::cardinal::Cardinal::{self, *};

pub const BUCKET_HOURS: [u32; 6] = [6, 9, 12, 15, 18, 21];

pub const WEEK: [[(f64, Cardinal); 6]; 7] = [
    [(17.0, Ene), (18.0, E), (19.0, E), (19.0, E), (20.0, E), (20.0, E)],
    [(20.0, E), (19.0, E), (16.0, E), (19.0, E), (21.0, E), (21.0, E)],
    [(15.0, Ene), (17.0, Ne), (8.0, Ne), (20.0, E), (16.0, E), (15.0, Ene)],
    [(8.0, Ene), (11.0, Ene), (8.0, Ne), (11.0, E), (11.0, E), (11.0, E)],
    [(3.0, Wsw), (3.0, Wsw), (7.0, Wsw), (7.0, Ssw), (10.0, E), (11.0, E)],
    [(4.0, Ne), (5.0, Ene), (4.0, Ne), (8.0, E), (15.0, E), (15.0, E)],
    [(6.0, Ne), (8.0, Ne), (14.0, Ne), (16.0, Ne), (13.0, Ene), (10.0, Ene)],
];
