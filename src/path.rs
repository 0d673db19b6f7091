use serde_json::{Map, Value};

/// A segment in a navigable path through a structured document.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Object field access by name
    ///
    /// # Examples
    /// - `name` → `Field("name")`
    /// - `user.email` → `[Field("user"), Field("email")]`
    Field(String),

    /// Array element access by index
    ///
    /// # Examples
    /// - `items[0]` → `[Field("items"), Index(0)]`
    /// - `items[-1]` → `[Field("items"), Index(-1)]` (counts from the end)
    Index(i64),
}

/// A sequence of path segments.
///
/// For `store.books[2].title` the path is:
/// - `PathSegment::Field("store")`
/// - `PathSegment::Field("books")`
/// - `PathSegment::Index(2)`
/// - `PathSegment::Field("title")`
pub type Path = Vec<PathSegment>;

/// Parses dotted / bracketed path syntax.
///
/// An empty path, `$` or `.` refers to the document root. Quoted field names
/// inside brackets (`["a.b"]`) may contain dots.
///
/// # Examples
/// ```
/// use typeflow::path::{parse_path, PathSegment};
///
/// let path = parse_path("items[1].name").unwrap();
/// assert_eq!(path, vec![
///     PathSegment::Field("items".into()),
///     PathSegment::Index(1),
///     PathSegment::Field("name".into()),
/// ]);
/// ```
pub fn parse_path(text: &str) -> Result<Path, String> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let chars: Vec<char> = trimmed.chars().collect();
    let mut segments = Vec::new();
    let mut field = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '.' => {
                if !field.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut field)));
                }
                i += 1;
            }
            '[' => {
                if !field.is_empty() {
                    segments.push(PathSegment::Field(std::mem::take(&mut field)));
                }
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| format!("Missing ']' in path '{}'", text))?;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();

                let segment = if let Ok(index) = inner.parse::<i64>() {
                    PathSegment::Index(index)
                } else {
                    let unquoted = inner
                        .strip_prefix('"')
                        .and_then(|s| s.strip_suffix('"'))
                        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
                        .unwrap_or(inner);
                    PathSegment::Field(unquoted.to_string())
                };
                segments.push(segment);
                i = close + 1;
            }
            ch => {
                field.push(ch);
                i += 1;
            }
        }
    }

    if !field.is_empty() {
        segments.push(PathSegment::Field(field));
    }

    Ok(segments)
}

fn resolve_index(index: i64, len: usize) -> Option<usize> {
    if index < 0 {
        let abs = index.unsigned_abs() as usize;
        if abs > len {
            return None;
        }
        Some(len - abs)
    } else {
        let index = index as usize;
        (index < len).then_some(index)
    }
}

/// Follows `path` from `root`. Missing fields and out-of-range indices
/// yield `None`.
pub fn lookup<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match (current, segment) {
            (Value::Object(map), PathSegment::Field(key)) => map.get(key)?,
            (Value::Object(map), PathSegment::Index(n)) => map.get(&n.to_string())?,
            (Value::Array(arr), PathSegment::Index(n)) => arr.get(resolve_index(*n, arr.len())?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path`, creating missing intermediate objects.
pub fn assign(root: &mut Value, path: &[PathSegment], value: Value) -> Result<(), String> {
    let Some((segment, rest)) = path.split_first() else {
        *root = value;
        return Ok(());
    };

    if root.is_null() && matches!(segment, PathSegment::Field(_)) {
        *root = Value::Object(Map::new());
    }

    match (root, segment) {
        (Value::Object(map), PathSegment::Field(key)) => {
            let child = map.entry(key.clone()).or_insert(Value::Null);
            assign(child, rest, value)
        }
        (Value::Array(arr), PathSegment::Index(idx)) => {
            let len = arr.len();
            let index = resolve_index(*idx, len).ok_or_else(|| {
                format!("Array index {} out of bounds (length: {})", idx, len)
            })?;
            assign(&mut arr[index], rest, value)
        }
        (_, PathSegment::Field(key)) => Err(format!("Cannot set field '{}' on a non-object", key)),
        (_, PathSegment::Index(idx)) => Err(format!("Cannot set index {} on a non-array", idx)),
    }
}

/// Removes the value at `path`. Returns whether something was removed;
/// missing paths are a silent no-op.
pub fn delete(root: &mut Value, path: &[PathSegment]) -> bool {
    let Some((segment, rest)) = path.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return match (root, segment) {
            (Value::Object(map), PathSegment::Field(key)) => map.shift_remove(key).is_some(),
            (Value::Array(arr), PathSegment::Index(idx)) => match resolve_index(*idx, arr.len()) {
                Some(index) => {
                    arr.remove(index);
                    true
                }
                None => false,
            },
            _ => false,
        };
    }

    match (root, segment) {
        (Value::Object(map), PathSegment::Field(key)) => match map.get_mut(key) {
            Some(child) => delete(child, rest),
            None => false,
        },
        (Value::Array(arr), PathSegment::Index(idx)) => {
            match resolve_index(*idx, arr.len()).and_then(|i| arr.get_mut(i)) {
                Some(child) => delete(child, rest),
                None => false,
            }
        }
        _ => false,
    }
}
