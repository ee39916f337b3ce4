//! Python bindings for detnms.
//!
//! Boxes cross the boundary as `(N, 4)` int32 arrays in `x, y, width, height`
//! order; scores are float32 and class ids uint32.

use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use detnms::lowlevel::{suppress_classes, suppress_with};
use detnms::{
    DecodeConfig, DetError, Detections as RustDetections, NmsConfig, NmsMode, NmsStrategy, Rect,
};

/// Convert a DetError to a Python exception.
fn to_py_err(err: DetError) -> PyErr {
    match err {
        DetError::Backend { .. } | DetError::ImageIo { .. } => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_strategy(strategy: &str) -> PyResult<NmsStrategy> {
    match strategy.to_lowercase().as_str() {
        "greedy" => Ok(NmsStrategy::Greedy),
        "sorted" => Ok(NmsStrategy::Sorted),
        _ => Err(PyValueError::new_err(
            "strategy must be 'greedy' or 'sorted'",
        )),
    }
}

fn boxes_from_array(boxes: &PyReadonlyArray2<'_, i32>) -> PyResult<Vec<Rect>> {
    let shape = boxes.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err("boxes must have shape (N, 4)"));
    }
    let view = boxes.as_array();
    Ok(view
        .rows()
        .into_iter()
        .map(|row| Rect::new(row[0], row[1], row[2], row[3]))
        .collect())
}

/// Decoded detections in suppression order.
#[pyclass]
pub struct Detections {
    inner: RustDetections,
}

#[pymethods]
impl Detections {
    /// Boxes as an (N, 4) int32 array of x, y, width, height.
    #[getter]
    fn boxes<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray2<i32>>> {
        let flat: Vec<i32> = self
            .inner
            .boxes()
            .iter()
            .flat_map(|r| [r.x, r.y, r.width, r.height])
            .collect();
        let array = Array2::from_shape_vec((self.inner.len(), 4), flat)
            .map_err(|err| PyRuntimeError::new_err(err.to_string()))?;
        Ok(array.into_pyarray(py))
    }

    /// Scores as a float32 array.
    #[getter]
    fn scores<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f32>> {
        self.inner.scores().to_vec().into_pyarray(py)
    }

    /// Class ids as a uint32 array.
    #[getter]
    fn classes<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u32>> {
        self.inner.classes().to_vec().into_pyarray(py)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!("Detections(len={})", self.inner.len())
    }
}

/// Intersection over union of two (x, y, width, height) rectangles.
#[pyfunction]
fn iou(a: (i32, i32, i32, i32), b: (i32, i32, i32, i32)) -> f32 {
    let a = Rect::new(a.0, a.1, a.2, a.3);
    let b = Rect::new(b.0, b.1, b.2, b.3);
    detnms::iou(&a, &b)
}

/// Greedy non-maximum suppression.
///
/// Args:
///     boxes: (N, 4) int32 array of x, y, width, height
///     scores: (N,) float32 array
///     iou_threshold: IoU above which lower-scored boxes are removed
///     classes: optional (N,) uint32 array; suppress within each class only
///     strategy: "greedy" or "sorted" (default: "greedy")
///
/// Returns:
///     Indices of kept boxes in selection order.
#[pyfunction]
#[pyo3(signature = (boxes, scores, iou_threshold, classes=None, strategy="greedy"))]
fn nms<'py>(
    py: Python<'py>,
    boxes: PyReadonlyArray2<'py, i32>,
    scores: PyReadonlyArray1<'py, f32>,
    iou_threshold: f32,
    classes: Option<PyReadonlyArray1<'py, u32>>,
    strategy: &str,
) -> PyResult<Bound<'py, PyArray1<usize>>> {
    let strategy = parse_strategy(strategy)?;
    let rects = boxes_from_array(&boxes)?;
    let scores = scores.as_array().to_vec();
    let kept = match classes {
        Some(classes) => {
            let classes = classes.as_array().to_vec();
            suppress_classes(&rects, &scores, &classes, iou_threshold, strategy)
        }
        None => suppress_with(&rects, &scores, iou_threshold, strategy),
    }
    .map_err(to_py_err)?;
    Ok(kept.into_pyarray(py))
}

/// Decode a raw detector buffer and suppress overlapping boxes.
///
/// Args:
///     raw: flat float32 array of (batch, class, score, xmin, ymin, xmax, ymax) records
///     image_width: original image width in pixels
///     image_height: original image height in pixels
///     score_threshold: records at or below this score are dropped (default: 0.3)
///     nms_threshold: IoU threshold for suppression (default: 0.45)
///     class_aware: suppress only within a class (default: False)
///     max_detections: keep at most this many boxes (default: None)
///     record_width: values per record (default: 7)
#[pyfunction]
#[pyo3(signature = (
    raw,
    image_width,
    image_height,
    score_threshold = 0.3,
    nms_threshold = 0.45,
    class_aware = false,
    max_detections = None,
    record_width = 7
))]
#[allow(clippy::too_many_arguments)]
fn decode(
    raw: PyReadonlyArray1<'_, f32>,
    image_width: u32,
    image_height: u32,
    score_threshold: f32,
    nms_threshold: f32,
    class_aware: bool,
    max_detections: Option<usize>,
    record_width: usize,
) -> PyResult<Detections> {
    let cfg = DecodeConfig {
        score_threshold,
        nms: NmsConfig {
            iou_threshold: nms_threshold,
            mode: if class_aware {
                NmsMode::ClassAware
            } else {
                NmsMode::Global
            },
            max_detections,
            ..NmsConfig::default()
        },
        record_width,
        ..DecodeConfig::default()
    };
    let data = raw.as_array().to_vec();
    let inner =
        detnms::decode(&data, image_width, image_height, &cfg).map_err(to_py_err)?;
    Ok(Detections { inner })
}

#[pymodule]
fn _detnms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detections>()?;
    m.add_function(wrap_pyfunction!(iou, m)?)?;
    m.add_function(wrap_pyfunction!(nms, m)?)?;
    m.add_function(wrap_pyfunction!(decode, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
