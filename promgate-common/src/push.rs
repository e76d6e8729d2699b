use serde::{Deserialize, Deserializer, Serialize};

/// A single metric sample carried by a push request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metric {
    /// Exposition name, used verbatim.
    #[serde(rename = "metric_name", default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Sample value.
    #[serde(rename = "metric_value", default, deserialize_with = "null_as_default")]
    pub value: f64,

    /// Declared type ("gauge", "counter", ...). Empty means no `# TYPE` line.
    #[serde(default, deserialize_with = "null_as_default")]
    pub metric_type: String,
}

impl Metric {
    /// Create an untyped metric.
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            metric_type: String::new(),
        }
    }

    /// Declare the metric type.
    pub fn with_type(mut self, metric_type: impl Into<String>) -> Self {
        self.metric_type = metric_type.into();
        self
    }
}

/// A label attached to every metric of a push request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl Label {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Intermediate representation shared by both parsers and the renderer.
///
/// Metric and label order is significant and kept as-is; label keys may
/// repeat.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PushRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<Metric>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Label>,
}

impl PushRequest {
    pub fn new(metrics: Vec<Metric>, labels: Vec<Label>) -> Self {
        Self { metrics, labels }
    }

    /// Append a label after all existing ones.
    pub fn push_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.labels.push(Label::new(key, value));
    }

    /// Builder form of [`push_label`](Self::push_label): the label goes last.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_label(key, value);
        self
    }
}

/// JSON `null` decodes to the field's zero value instead of failing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
