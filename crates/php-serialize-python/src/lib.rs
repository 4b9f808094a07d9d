//! Python bindings for php-serialize-core.

use std::io::{self, Read};

use pyo3::exceptions::{PyAttributeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};

use php_serialize_core::{
    from_bytes, from_reader, json::to_json_string, to_bytes, unmangle_property_name, EncodeError,
    MalformedInputError, PhpValue,
};

pyo3::create_exception!(php_serialize, PhpSerializeError, PyValueError);

/// Deepest Python container nesting `dumps` will follow.
const MAX_DEPTH: usize = 512;

/// Options applied while turning decoded values into Python objects.
struct LoadOptions<'py> {
    object_hook: Option<Bound<'py, PyAny>>,
    array_hook: Option<Bound<'py, PyAny>>,
    decode_strings: bool,
}

fn decode_error(e: MalformedInputError) -> PyErr {
    PhpSerializeError::new_err(e.to_string())
}

fn encode_error(e: EncodeError) -> PyErr {
    match e {
        EncodeError::UnsupportedType { .. } => PyTypeError::new_err(e.to_string()),
        other => PhpSerializeError::new_err(other.to_string()),
    }
}

/// Convert a PHP string to `bytes`, or to `str` when `decode` is set.
fn string_to_python(py: Python<'_>, bytes: &[u8], decode: bool) -> PyResult<PyObject> {
    if decode {
        let s = std::str::from_utf8(bytes).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(s.to_object(py))
    } else {
        Ok(PyBytes::new_bound(py, bytes).into_any().unbind())
    }
}

/// Add ordered PHP entries to a Python dict.
fn fill_dict<'py>(
    py: Python<'py>,
    dict: &Bound<'py, PyDict>,
    entries: &[(PhpValue, PhpValue)],
    opts: &LoadOptions<'py>,
) -> PyResult<()> {
    for (k, v) in entries {
        dict.set_item(php_to_python(py, k, opts)?, php_to_python(py, v, opts)?)?;
    }
    Ok(())
}

/// Convert a PHP array to a dict, or hand its `(key, value)` pairs to the
/// array hook in wire order.
fn array_to_python<'py>(
    py: Python<'py>,
    entries: &[(PhpValue, PhpValue)],
    opts: &LoadOptions<'py>,
) -> PyResult<PyObject> {
    match opts.array_hook {
        Some(ref hook) => {
            let pairs = entries
                .iter()
                .map(|(k, v)| {
                    Ok(PyTuple::new_bound(
                        py,
                        [php_to_python(py, k, opts)?, php_to_python(py, v, opts)?],
                    ))
                })
                .collect::<PyResult<Vec<_>>>()?;
            Ok(hook.call1((PyList::new_bound(py, pairs),))?.unbind())
        }
        None => {
            let dict = PyDict::new_bound(py);
            fill_dict(py, &dict, entries, opts)?;
            Ok(dict.into_any().unbind())
        }
    }
}

/// Convert a PhpValue to a Python object.
///
/// Arrays become dicts, since PHP does not distinguish lists, unless an
/// array hook is set.
fn php_to_python<'py>(py: Python<'py>, value: &PhpValue, opts: &LoadOptions<'py>) -> PyResult<PyObject> {
    match value {
        PhpValue::Null => Ok(py.None()),
        PhpValue::Bool(b) => Ok(b.to_object(py)),
        PhpValue::Int(i) => Ok(i.to_object(py)),
        PhpValue::Float(f) => Ok(f.to_object(py)),
        PhpValue::String(s) => string_to_python(py, s, opts.decode_strings),
        PhpValue::Array(items) => array_to_python(py, items, opts),
        PhpValue::Object {
            class_name,
            properties,
        } => {
            let fields = PyDict::new_bound(py);
            match opts.object_hook {
                Some(ref hook) => {
                    fill_dict(py, &fields, properties, opts)?;
                    let name = string_to_python(py, class_name.as_bytes(), opts.decode_strings)?;
                    Ok(hook.call1((name, fields))?.unbind())
                }
                None => {
                    // set first so a real `__class__` property wins
                    fields.set_item("__class__", class_name.as_str())?;
                    fill_dict(py, &fields, properties, opts)?;
                    Ok(fields.into_any().unbind())
                }
            }
        }
    }
}

/// Convert a Python object to a PhpValue.
///
/// Objects exposing `__name__` and a `__php_vars__` dict become PHP objects.
fn python_to_php(obj: &Bound<'_, PyAny>, depth: usize) -> PyResult<PhpValue> {
    if depth > MAX_DEPTH {
        return Err(PhpSerializeError::new_err(format!(
            "maximum nesting depth ({}) exceeded",
            MAX_DEPTH
        )));
    }

    if obj.is_none() {
        return Ok(PhpValue::Null);
    }
    // bool before int: bool is an int subclass
    if let Ok(b) = obj.downcast::<PyBool>() {
        return Ok(PhpValue::Bool(b.is_true()));
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(PhpValue::Int(obj.extract::<i64>()?));
    }
    if let Ok(f) = obj.downcast::<PyFloat>() {
        return Ok(PhpValue::Float(f.value()));
    }
    if let Ok(s) = obj.downcast::<PyString>() {
        return Ok(PhpValue::from(s.to_cow()?.as_ref()));
    }
    if let Ok(b) = obj.downcast::<PyBytes>() {
        return Ok(PhpValue::from(b.as_bytes()));
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        let items = list
            .iter()
            .map(|item| python_to_php(&item, depth + 1))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(PhpValue::list(items));
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        let items = tuple
            .iter()
            .map(|item| python_to_php(&item, depth + 1))
            .collect::<PyResult<Vec<_>>>()?;
        return Ok(PhpValue::list(items));
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        return Ok(PhpValue::Array(dict_entries(dict, depth)?));
    }
    if obj.hasattr("__php_vars__")? && obj.hasattr("__name__")? {
        let name = obj.getattr("__name__")?;
        let class_name = match name.downcast::<PyBytes>() {
            Ok(b) => String::from_utf8_lossy(b.as_bytes()).into_owned(),
            Err(_) => name.extract::<String>()?,
        };
        let vars = obj.getattr("__php_vars__")?;
        let vars = vars.downcast::<PyDict>()?;
        return Ok(PhpValue::Object {
            class_name,
            properties: dict_entries(vars, depth)?,
        });
    }

    Err(PyTypeError::new_err(format!(
        "can't serialize {} to PHP serialize format",
        obj.get_type()
    )))
}

fn dict_entries(dict: &Bound<'_, PyDict>, depth: usize) -> PyResult<Vec<(PhpValue, PhpValue)>> {
    dict.iter()
        .map(|(k, v)| Ok((python_to_php(&k, depth + 1)?, python_to_php(&v, depth + 1)?)))
        .collect()
}

/// A Python file-like object read through its `read(n)` method.
struct PyFile<'py> {
    file: Bound<'py, PyAny>,
}

impl Read for PyFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let to_io = |e: PyErr| io::Error::new(io::ErrorKind::Other, e.to_string());
        let chunk = self.file.call_method1("read", (buf.len(),)).map_err(to_io)?;
        let chunk = chunk.downcast::<PyBytes>().map_err(|e| to_io(e.into()))?;
        let bytes = chunk.as_bytes();
        if bytes.len() > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "read() returned more bytes than requested",
            ));
        }
        buf[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }
}

/// A PHP object: a class name plus its member dict.
///
/// Members read and write as attributes. Pass the class itself as
/// `object_hook` to get these back from `loads`.
#[pyclass(name = "phpobject", module = "php_serialize")]
struct PhpObject {
    name: PyObject,
    vars: Py<PyDict>,
}

#[pymethods]
impl PhpObject {
    #[new]
    #[pyo3(signature = (name, d=None))]
    fn new(py: Python<'_>, name: PyObject, d: Option<Bound<'_, PyDict>>) -> Self {
        let vars = d.unwrap_or_else(|| PyDict::new_bound(py));
        Self {
            name,
            vars: vars.unbind(),
        }
    }

    #[getter(__name__)]
    fn name(&self, py: Python<'_>) -> PyObject {
        self.name.clone_ref(py)
    }

    #[getter(__php_vars__)]
    fn vars(&self, py: Python<'_>) -> Py<PyDict> {
        self.vars.clone_ref(py)
    }

    fn __getattr__(&self, py: Python<'_>, attr: &str) -> PyResult<PyObject> {
        let vars = self.vars.bind(py);
        if let Some(value) = vars.get_item(attr)? {
            return Ok(value.unbind());
        }
        // members decoded without decode_strings have bytes names
        if let Some(value) = vars.get_item(PyBytes::new_bound(py, attr.as_bytes()))? {
            return Ok(value.unbind());
        }
        Err(PyAttributeError::new_err(attr.to_owned()))
    }

    fn __setattr__(&mut self, py: Python<'_>, attr: &str, value: Bound<'_, PyAny>) -> PyResult<()> {
        match attr {
            "__name__" => self.name = value.unbind(),
            "__php_vars__" => self.vars = value.downcast_into::<PyDict>()?.unbind(),
            _ => self.vars.bind(py).set_item(attr, value)?,
        }
        Ok(())
    }

    /// Members with visibility prefixes stripped.
    fn _asdict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        convert_member_dict(py, self.vars.bind(py))
    }

    fn __repr__(&self, py: Python<'_>) -> PyResult<String> {
        Ok(format!(
            "phpobject({}, {})",
            self.name.bind(py).repr()?,
            self.vars.bind(py).repr()?
        ))
    }
}

/// Strip visibility prefixes from member names.
///
/// Handles PHP's NUL-separated `\0*\0name` and `\0Class\0name` forms as
/// well as the space-separated spelling. `str` keys stay `str` and `bytes`
/// keys stay `bytes`.
#[pyfunction]
fn convert_member_dict<'py>(py: Python<'py>, d: &Bound<'py, PyDict>) -> PyResult<Bound<'py, PyDict>> {
    let out = PyDict::new_bound(py);
    for (k, v) in d.iter() {
        if let Ok(s) = k.downcast::<PyString>() {
            let name = s.to_cow()?;
            let bare = String::from_utf8_lossy(unmangle_property_name(name.as_bytes()));
            out.set_item(bare, v)?;
        } else if let Ok(b) = k.downcast::<PyBytes>() {
            out.set_item(PyBytes::new_bound(py, unmangle_property_name(b.as_bytes())), v)?;
        } else {
            out.set_item(k, v)?;
        }
    }
    Ok(out)
}

/// Values of a dict keyed `0..len-1`, in key order.
fn sequence_values<'py>(d: &Bound<'py, PyDict>) -> PyResult<Vec<Bound<'py, PyAny>>> {
    (0..d.len())
        .map(|i| {
            d.get_item(i)?
                .ok_or_else(|| PyValueError::new_err(format!("dict is not a sequence: missing key {}", i)))
        })
        .collect()
}

/// Convert a dict keyed `0..len-1` (as decoded PHP lists are) into a list.
///
/// Raises:
///     ValueError: If any index is missing
#[pyfunction]
fn dict_to_list<'py>(py: Python<'py>, d: &Bound<'py, PyDict>) -> PyResult<Bound<'py, PyList>> {
    Ok(PyList::new_bound(py, sequence_values(d)?))
}

/// Convert a dict keyed `0..len-1` into a tuple.
#[pyfunction]
fn dict_to_tuple<'py>(py: Python<'py>, d: &Bound<'py, PyDict>) -> PyResult<Bound<'py, PyTuple>> {
    Ok(PyTuple::new_bound(py, sequence_values(d)?))
}

/// Serialize a Python object to PHP serialize bytes.
///
/// Args:
///     obj: None, bool, int, float, str, bytes, list, tuple, dict, or an
///         object with `__name__` and a `__php_vars__` dict
///
/// Returns:
///     The serialized bytes
///
/// Raises:
///     TypeError: If a value has no PHP representation
///
/// Example:
///     >>> from php_serialize import dumps
///     >>> dumps({'b': 1, 'a': 2})
///     b'a:2:{s:1:"b";i:1;s:1:"a";i:2;}'
#[pyfunction]
fn dumps<'py>(py: Python<'py>, obj: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyBytes>> {
    let value = python_to_php(obj, 0)?;
    let bytes = to_bytes(&value).map_err(encode_error)?;
    Ok(PyBytes::new_bound(py, &bytes))
}

/// Serialize a Python object and write it to a file-like object.
#[pyfunction]
fn dump(obj: &Bound<'_, PyAny>, fp: &Bound<'_, PyAny>) -> PyResult<()> {
    let bytes = dumps(obj.py(), obj)?;
    fp.call_method1("write", (bytes,))?;
    Ok(())
}

/// Deserialize PHP serialized data to a Python object.
///
/// Args:
///     data: Bytes containing PHP serialized data
///     object_hook: Called as `object_hook(class_name, fields)` for every
///         decoded object; its return value replaces the object. Without a
///         hook objects become dicts with a `__class__` entry; a property
///         of that name overrides it.
///     array_hook: Called with the list of `(key, value)` pairs of every
///         decoded array, in order; its return value replaces the dict.
///         `collections.OrderedDict` works as-is.
///     decode_strings: Return strings as `str` instead of `bytes` (default: False)
///
/// Returns:
///     The deserialized Python object. PHP arrays become dicts.
///
/// Raises:
///     PhpSerializeError: If the data cannot be parsed
///
/// Example:
///     >>> from php_serialize import loads
///     >>> loads(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}', decode_strings=True)
///     {'name': 'Alice', 'age': 30}
#[pyfunction]
#[pyo3(signature = (data, *, object_hook=None, array_hook=None, decode_strings=false))]
fn loads<'py>(
    py: Python<'py>,
    data: &[u8],
    object_hook: Option<Bound<'py, PyAny>>,
    array_hook: Option<Bound<'py, PyAny>>,
    decode_strings: bool,
) -> PyResult<PyObject> {
    let value = from_bytes(data).map_err(decode_error)?;
    let opts = LoadOptions {
        object_hook,
        array_hook,
        decode_strings,
    };
    php_to_python(py, &value, &opts)
}

/// Deserialize one value from a file-like object.
///
/// Reads exactly the bytes of one value, so repeated calls return
/// consecutive values written with `dump`.
#[pyfunction]
#[pyo3(signature = (fp, *, object_hook=None, array_hook=None, decode_strings=false))]
fn load<'py>(
    py: Python<'py>,
    fp: Bound<'py, PyAny>,
    object_hook: Option<Bound<'py, PyAny>>,
    array_hook: Option<Bound<'py, PyAny>>,
    decode_strings: bool,
) -> PyResult<PyObject> {
    let value = from_reader(PyFile { file: fp }).map_err(decode_error)?;
    let opts = LoadOptions {
        object_hook,
        array_hook,
        decode_strings,
    };
    php_to_python(py, &value, &opts)
}

/// Deserialize PHP serialized data directly to a JSON string.
///
/// It avoids the overhead of creating intermediate Python objects.
///
/// Example:
///     >>> from php_serialize import loads_json
///     >>> loads_json(b'a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}')
///     '{"name":"Alice","age":30}'
#[pyfunction]
fn loads_json(data: &[u8]) -> PyResult<String> {
    let value = from_bytes(data).map_err(decode_error)?;
    to_json_string(&value).map_err(|e: serde_json::Error| PhpSerializeError::new_err(e.to_string()))
}

/// Check if data looks like PHP serialized format.
///
/// This is a quick check that doesn't fully validate the data.
#[pyfunction]
fn is_serialized(data: &[u8]) -> bool {
    php_serialize_core::is_serialized(data)
}

/// Get the version of the library.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// PHP serialize module for Python.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("PhpSerializeError", m.py().get_type_bound::<PhpSerializeError>())?;
    m.add_class::<PhpObject>()?;
    m.add_function(wrap_pyfunction!(dumps, m)?)?;
    m.add_function(wrap_pyfunction!(dump, m)?)?;
    m.add_function(wrap_pyfunction!(loads, m)?)?;
    m.add_function(wrap_pyfunction!(load, m)?)?;
    m.add_function(wrap_pyfunction!(loads_json, m)?)?;
    m.add_function(wrap_pyfunction!(is_serialized, m)?)?;
    m.add_function(wrap_pyfunction!(dict_to_list, m)?)?;
    m.add_function(wrap_pyfunction!(dict_to_tuple, m)?)?;
    m.add_function(wrap_pyfunction!(convert_member_dict, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}
