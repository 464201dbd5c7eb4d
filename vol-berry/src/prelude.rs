//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx3d, Idx3dI, Matrix4, Point3, Rgb, Vector3};

pub use crate::data::{GridShape, PosIter3, Volume, VolumeLayer, VolumeSpace, VoxelData};

pub use crate::selection::{LabelPoint, RoiId, SelectionRegion, SelectionStore};

pub use crate::flood::{
    flood, BoundaryPath, FloodParams, FloodReport, FloodState, Flooder, FuzzinessKind,
};

pub use crate::raster::PlaneRasterizer;

pub use crate::histogram::Histogram;

pub use crate::error::{FloodError, SelectionError, SpaceError};

pub use crate::consts::color::{palette, PALETTE};
