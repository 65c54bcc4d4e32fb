//! Landmark index tables for the upstream face-mesh detector.
//!
//! The detector assigns each physical facial feature a stable integer
//! index (MediaPipe FaceMesh numbering, 468 points). These tables are
//! fixed configuration; nothing here is discovered at runtime.

/// Outer upper-lip center.
pub const TOP_OUTER: u32 = 0;
/// Outer lower-lip center.
pub const BOTTOM_OUTER: u32 = 17;
/// Left mouth corner (image-left).
pub const LEFT_CORNER: u32 = 61;
/// Right mouth corner.
pub const RIGHT_CORNER: u32 = 291;
/// Inner upper-lip center.
pub const TOP_INNER: u32 = 13;
/// Inner lower-lip center.
pub const BOTTOM_INNER: u32 = 14;
/// Left inner mouth corner.
pub const LEFT_CORNER_INNER: u32 = 78;
/// Right inner mouth corner.
pub const RIGHT_CORNER_INNER: u32 = 308;

/// The basic 8-point mouth set. Required minimum input for metric
/// extraction; everything else degrades gracefully when absent.
pub const BASIC: [u32; 8] = [
    TOP_OUTER,
    BOTTOM_OUTER,
    LEFT_CORNER,
    RIGHT_CORNER,
    TOP_INNER,
    BOTTOM_INNER,
    LEFT_CORNER_INNER,
    RIGHT_CORNER_INNER,
];

/// Ordered lip sequences, left corner to right corner.
pub const UPPER_OUTER: [u32; 11] = [61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291];
pub const LOWER_OUTER: [u32; 11] = [61, 146, 91, 181, 84, 17, 314, 405, 321, 375, 291];
pub const UPPER_INNER: [u32; 11] = [78, 191, 80, 81, 82, 13, 312, 311, 310, 415, 308];
pub const LOWER_INNER: [u32; 11] = [78, 95, 88, 178, 87, 14, 317, 402, 318, 324, 308];

/// Closed outer-lip ring, counter-clockwise. Used for the polygon
/// metrics (circularity, ellipticity, symmetry).
pub const OUTER_RING: [u32; 20] = [
    61, 185, 40, 39, 37, 0, 267, 269, 270, 409, 291, 375, 321, 405, 314, 17, 84, 181, 91, 146,
];

/// Averaging groups for the contour-refined anchors. More stable than
/// the single basic points when the contour set is tracked.
pub const TOP_GROUP: [u32; 3] = [37, 0, 267];
pub const BOTTOM_GROUP: [u32; 3] = [84, 17, 314];
pub const LEFT_CORNER_GROUP: [u32; 3] = [61, 185, 146];
pub const RIGHT_CORNER_GROUP: [u32; 3] = [291, 409, 375];

/// Extended anchors, present only in the 34-point contour superset.
pub const LEFT_CHEEK: u32 = 50;
pub const RIGHT_CHEEK: u32 = 280;
pub const CHIN: u32 = 152;
pub const NOSE_BRIDGE: u32 = 168;
pub const LEFT_EYE_OUTER: u32 = 33;
pub const RIGHT_EYE_OUTER: u32 = 263;

pub const EXTENDED_ANCHORS: [u32; 6] = [
    LEFT_CHEEK,
    RIGHT_CHEEK,
    CHIN,
    NOSE_BRIDGE,
    LEFT_EYE_OUTER,
    RIGHT_EYE_OUTER,
];
