// This module defines the JSON-RPC messages exchanged with the PDU bulk endpoint.

use serde::{Deserialize, Serialize};

use crate::error::CallError;

pub const JSONRPC_VERSION: &str = "2.0";

/// Method of the outer call, which runs every sub-call of the batch.
pub const BULK_METHOD: &str = "performBulk";

/// Method of each sub-call, which reads one sensor.
pub const READING_METHOD: &str = "getReading";

/// Correlation id of the outer `performBulk` call.
pub const BULK_ID: i64 = 3;

/// A numeric sensor of the PDU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensor {
    /// Correlation id of the sub-call that reads this sensor.
    pub id: i64,
    /// Resource path of the sensor on the device.
    pub rid: &'static str,
    /// Name of the metric produced from the reading.
    pub caption: &'static str,
}

/// The sensors read on each poll: total apparent and active power of inlet I0.
pub const PDU_SENSORS: &[Sensor] = &[
    Sensor {
        id: 1,
        rid: "/tfwopaque/sensors.NumericSensor:4.0.3/I0ApparentPower",
        caption: "ApparentPower",
    },
    Sensor {
        id: 2,
        rid: "/tfwopaque/sensors.NumericSensor:4.0.3/I0ActivePower",
        caption: "ActivePower",
    },
];

/// Returns the caption of the sensor that has the given correlation id,
/// or an empty string if there is no such sensor.
pub fn caption_of(sensors: &[Sensor], id: i64) -> &'static str {
    sensors.iter().find(|s| s.id == id).map(|s| s.caption).unwrap_or_default()
}

/// A JSON-RPC 2.0 call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcCall<P> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: P,
    pub id: i64,
}

/// Sub-call that reads one sensor. Its params are `null`.
pub type SensorRequest = RpcCall<()>;

/// The whole batch, ready to be sent to the bulk endpoint.
pub type BatchRequest = RpcCall<BulkParams>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkParams {
    pub requests: Vec<BulkEntry>,
}

/// A sub-call and the resource it applies to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkEntry {
    pub rid: &'static str,
    pub json: SensorRequest,
}

impl SensorRequest {
    pub fn reading(id: i64) -> Self {
        RpcCall {
            jsonrpc: JSONRPC_VERSION,
            method: READING_METHOD,
            params: (),
            id,
        }
    }
}

impl BatchRequest {
    /// Builds a batch that reads every given sensor, in order.
    pub fn for_sensors(sensors: &[Sensor]) -> Self {
        let requests = sensors
            .iter()
            .map(|s| BulkEntry {
                rid: s.rid,
                json: SensorRequest::reading(s.id),
            })
            .collect();
        RpcCall {
            jsonrpc: JSONRPC_VERSION,
            method: BULK_METHOD,
            params: BulkParams { requests },
            id: BULK_ID,
        }
    }
}

/// A JSON-RPC 2.0 response, which carries either a result or an error.
#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    /// Echoed correlation id. Devices may send any integer, or nothing at all.
    pub id: Option<i64>,
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl<T> RpcResponse<T> {
    /// Extracts the result of the call, or turns the JSON-RPC error into a [`CallError`].
    pub fn into_result(self) -> Result<T, CallError> {
        match (self.result, self.error) {
            (_, Some(RpcError { code, message })) => Err(CallError::Rpc { code, message }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(CallError::MissingResult),
        }
    }
}

/// Result of the `performBulk` call: one reply per sub-call, in any order.
#[derive(Debug, Deserialize)]
pub struct BatchResponse {
    pub responses: Vec<BulkReply>,
}

#[derive(Debug, Deserialize)]
pub struct BulkReply {
    pub json: RpcResponse<ReadingResult>,
}

#[derive(Debug, Deserialize)]
pub struct ReadingResult {
    #[serde(rename = "_ret_")]
    pub ret: SensorReading,
}

/// A sensor reading as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SensorReading {
    pub valid: bool,
    pub value: f64,
}

/// A reading, named after the sensor it comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Caption of the sensor, empty if the reply had an unknown id.
    pub caption: String,
    pub value: f64,
}

impl BatchResponse {
    /// Turns the replies into readings, matching each reply to its sensor by id.
    ///
    /// The position of a reply in the batch is meaningless. A reply with an unknown
    /// or missing id gives a reading with an empty caption, and a sensor without
    /// reply gives nothing.
    pub fn into_readings(self, sensors: &[Sensor]) -> Result<Vec<Reading>, CallError> {
        let mut readings = Vec::with_capacity(self.responses.len());
        for reply in self.responses {
            let id = reply.json.id;
            let reading = reply.json.into_result()?.ret;
            let caption = match id {
                Some(id) => caption_of(sensors, id),
                None => "",
            };
            if caption.is_empty() {
                log::warn!("reply with unknown id {id:?}, its value {} has no caption", reading.value);
            }
            if !reading.valid {
                log::warn!("sensor {caption:?} (id {id:?}) reports an invalid reading: {}", reading.value);
            }
            readings.push(Reading {
                caption: caption.to_owned(),
                value: reading.value,
            });
        }
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reply(id: i64, value: f64) -> serde_json::Value {
        serde_json::json!({"json": {"jsonrpc": "2.0", "result": {"_ret_": {"valid": true, "value": value}}, "id": id}})
    }

    fn batch(replies: Vec<serde_json::Value>) -> BatchResponse {
        serde_json::from_value(serde_json::json!({ "responses": replies })).unwrap()
    }

    #[test]
    fn batch_request_shape() {
        let request = BatchRequest::for_sensors(PDU_SENSORS);
        let expected = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "performBulk",
            "params": {
                "requests": [
                    {
                        "rid": "/tfwopaque/sensors.NumericSensor:4.0.3/I0ApparentPower",
                        "json": {"jsonrpc": "2.0", "method": "getReading", "params": null, "id": 1}
                    },
                    {
                        "rid": "/tfwopaque/sensors.NumericSensor:4.0.3/I0ActivePower",
                        "json": {"jsonrpc": "2.0", "method": "getReading", "params": null, "id": 2}
                    }
                ]
            },
            "id": 3
        });
        assert_eq!(serde_json::to_value(&request).unwrap(), expected);
    }

    #[test]
    fn sensor_request_has_null_params() {
        let json = serde_json::to_string(&SensorRequest::reading(7)).unwrap();
        assert_eq!(json, r#"{"jsonrpc":"2.0","method":"getReading","params":null,"id":7}"#);
    }

    #[test]
    fn correlation_uses_ids_not_positions() {
        let in_order = batch(vec![reply(1, 230.5), reply(2, 210.25)]);
        let reversed = batch(vec![reply(2, 210.25), reply(1, 230.5)]);

        for response in [in_order, reversed] {
            let mut readings = response.into_readings(PDU_SENSORS).unwrap();
            readings.sort_by(|a, b| a.caption.cmp(&b.caption));
            assert_eq!(
                readings,
                vec![
                    Reading {
                        caption: "ActivePower".to_owned(),
                        value: 210.25
                    },
                    Reading {
                        caption: "ApparentPower".to_owned(),
                        value: 230.5
                    },
                ]
            );
        }
    }

    #[test]
    fn missing_reply_is_absent() {
        let readings = batch(vec![reply(2, 99.0)]).into_readings(PDU_SENSORS).unwrap();
        assert_eq!(
            readings,
            vec![Reading {
                caption: "ActivePower".to_owned(),
                value: 99.0
            }]
        );
    }

    #[test]
    fn unknown_id_has_empty_caption() {
        let readings = batch(vec![reply(1, 1.0), reply(42, 2.0)])
            .into_readings(PDU_SENSORS)
            .unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[1].caption.is_empty());
        assert_eq!(readings[1].value, 2.0);
    }

    #[test]
    fn invalid_reading_is_kept() {
        let response: BatchResponse = serde_json::from_value(serde_json::json!({
            "responses": [{"json": {"result": {"_ret_": {"valid": false, "value": 0.0}}, "id": 1}}]
        }))
        .unwrap();
        let readings = response.into_readings(PDU_SENSORS).unwrap();
        assert_eq!(readings[0].caption, "ApparentPower");
    }

    #[test]
    fn sub_call_error() {
        let response: BatchResponse = serde_json::from_value(serde_json::json!({
            "responses": [
                reply(1, 1.0),
                {"json": {"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": 2}}
            ]
        }))
        .unwrap();
        let err = response.into_readings(PDU_SENSORS).unwrap_err();
        assert!(
            matches!(&err, CallError::Rpc { code: -32601, message } if message == "Method not found"),
            "unexpected error {err:?}"
        );
    }

    #[test]
    fn out_of_range_ids_have_empty_caption() {
        let readings = batch(vec![reply(1, 1.0), reply(-1, 2.0), reply(4294967296, 3.0), reply(2, 4.0)])
            .into_readings(PDU_SENSORS)
            .unwrap();
        assert_eq!(
            readings,
            vec![
                Reading {
                    caption: "ApparentPower".to_owned(),
                    value: 1.0
                },
                Reading {
                    caption: String::new(),
                    value: 2.0
                },
                Reading {
                    caption: String::new(),
                    value: 3.0
                },
                Reading {
                    caption: "ActivePower".to_owned(),
                    value: 4.0
                },
            ]
        );
    }

    #[test]
    fn reply_without_id_has_empty_caption() {
        let response: BatchResponse = serde_json::from_value(serde_json::json!({
            "responses": [
                {"json": {"result": {"_ret_": {"valid": true, "value": 1.0}}}},
                reply(2, 4.0)
            ]
        }))
        .unwrap();
        let readings = response.into_readings(PDU_SENSORS).unwrap();
        assert_eq!(readings.len(), 2);
        assert!(readings[0].caption.is_empty());
        assert_eq!(readings[0].value, 1.0);
        assert_eq!(readings[1].caption, "ActivePower");
    }

    #[test]
    fn caption_table() {
        assert_eq!(caption_of(PDU_SENSORS, 1), "ApparentPower");
        assert_eq!(caption_of(PDU_SENSORS, 2), "ActivePower");
        assert!(caption_of(PDU_SENSORS, 3).is_empty());
    }
}
