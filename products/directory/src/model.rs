use serde::{Deserialize, Serialize};

/// Business-level success marker carried in the envelope `status` field.
pub const SUCCESS_MARKER: &str = "success";

/// One employee record as published by the upstream directory.
///
/// Salary and age travel as decimal strings on the wire. They are parsed on
/// decode, so a record that made it into this struct always carries either a
/// valid integer or nothing at all.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Employee {
    #[serde(default, deserialize_with = "wire::id")]
    pub id: String,
    #[serde(rename = "employee_name", default)]
    pub name: Option<String>,
    #[serde(rename = "employee_salary", default, with = "wire::numeric")]
    pub salary: Option<i64>,
    #[serde(rename = "employee_age", default, with = "wire::numeric")]
    pub age: Option<i64>,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub profile_image: String,
}

/// `{status, data: [Employee]}` returned by the list endpoint.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope {
    #[serde(default)]
    pub status: String,
    pub data: Vec<Employee>,
}

/// `{status, data: Employee}` returned by the single-item endpoint.
#[derive(Debug, Deserialize)]
pub struct SingleEnvelope {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub data: Option<Employee>,
}

/// `{status, data}` returned by create and delete. Only `status` matters, and
/// a missing or `null` marker counts as a refusal.
#[derive(Debug, Deserialize)]
pub struct MutationEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

mod wire {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Int(value)) => value.to_string(),
            Some(Raw::Text(text)) => text,
            None => String::new(),
        })
    }

    pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub mod numeric {
        use super::Raw;
        use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

        pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(number) => serializer.collect_str(number),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<Raw>::deserialize(deserializer)? {
                None => Ok(None),
                Some(Raw::Int(value)) => Ok(Some(value)),
                Some(Raw::Text(text)) => text
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("invalid integer `{text}`"))),
            }
        }
    }
}
