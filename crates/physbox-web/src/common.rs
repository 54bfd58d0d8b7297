use physbox::prelude::*;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
#[derive(Serialize, Deserialize, Clone, Copy, Default)]
pub struct Tuple2 {
    pub x: FloatNum,
    pub y: FloatNum,
}

impl From<&Point> for Tuple2 {
    fn from(value: &Point) -> Self {
        Tuple2 {
            x: value.x(),
            y: value.y(),
        }
    }
}

impl From<Tuple2> for Point {
    fn from(value: Tuple2) -> Self {
        Self::new(value.x, value.y)
    }
}

impl From<&Vector> for Tuple2 {
    fn from(value: &Vector) -> Self {
        Tuple2 {
            x: value.x(),
            y: value.y(),
        }
    }
}

impl From<Tuple2> for Vector {
    fn from(value: Tuple2) -> Vector {
        (value.x, value.y).into()
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(typescript_type = "Vector")]
    pub type WebVector;
    #[wasm_bindgen(typescript_type = "Point")]
    pub type WebPoint;
    #[wasm_bindgen(typescript_type = "Endpoint")]
    pub type WebEndpoint;
    #[wasm_bindgen(typescript_type = "ObjectDescriptor")]
    pub type WebObjectDescriptor;
    #[wasm_bindgen(typescript_type = "Partial<SceneObject>")]
    pub type WebObjectPatch;
    #[wasm_bindgen(typescript_type = "SceneObject")]
    pub type WebSceneObject;
    #[wasm_bindgen(typescript_type = "Partial<RopeOptions>")]
    pub type WebRopeOptions;
    #[wasm_bindgen(typescript_type = "Partial<SpringOptions>")]
    pub type WebSpringOptions;
    #[wasm_bindgen(typescript_type = "Partial<PulleyOptions>")]
    pub type WebPulleyOptions;
    #[wasm_bindgen(typescript_type = "ConstraintPatch")]
    pub type WebConstraintPatch;
    #[wasm_bindgen(typescript_type = "Constraint")]
    pub type WebConstraintData;
    #[wasm_bindgen(typescript_type = "SceneState")]
    pub type WebSceneState;
    #[wasm_bindgen(typescript_type = "BodyTelemetry")]
    pub type WebBodyTelemetry;
    #[wasm_bindgen(typescript_type = "Partial<SandboxConfig>")]
    pub type WebSandboxConfig;
}

/// read a serde value out of js, `what` names the expected shape in the error
pub(crate) fn from_js<T: DeserializeOwned>(
    value: impl Into<JsValue>,
    what: &'static str,
) -> Result<T, &'static str> {
    serde_wasm_bindgen::from_value(value.into()).map_err(|err| {
        log::debug!("{}: {}", what, err);
        what
    })
}

/// like `from_js` but `undefined` and `null` give the default value
pub(crate) fn from_js_or_default<T: DeserializeOwned + Default>(
    value: Option<impl Into<JsValue>>,
    what: &'static str,
) -> Result<T, &'static str> {
    match value.map(Into::<JsValue>::into) {
        Some(value) if !value.is_undefined() && !value.is_null() => from_js(value, what),
        _ => Ok(T::default()),
    }
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    // plain objects instead of Map for structs
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or_else(|err| {
        log::warn!("serialize to js failed: {}", err);
        JsValue::NULL
    })
}

impl From<&Point> for WebPoint {
    fn from(value: &Point) -> Self {
        to_js(&Tuple2::from(value)).into()
    }
}

impl From<&Vector> for WebVector {
    fn from(value: &Vector) -> Self {
        to_js(&Tuple2::from(value)).into()
    }
}

impl TryInto<Vector> for WebVector {
    type Error = &'static str;

    fn try_into(self) -> Result<Vector, Self::Error> {
        let value: Tuple2 = from_js(self, "vector should be {x:number,y:number}")?;
        Ok(value.into())
    }
}

impl TryInto<Point> for WebPoint {
    type Error = &'static str;

    fn try_into(self) -> Result<Point, Self::Error> {
        let value: Tuple2 = from_js(self, "point should be {x:number,y:number}")?;
        Ok(value.into())
    }
}

impl TryInto<Endpoint> for WebEndpoint {
    type Error = &'static str;

    fn try_into(self) -> Result<Endpoint, Self::Error> {
        from_js(
            self,
            "endpoint should be {type:'body',id,offset?} or {type:'fixed',point}",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_conversion() {
        let point = Point::new(1., -2.);
        let tuple: Tuple2 = (&point).into();
        assert_eq!(tuple.x, 1.);
        assert_eq!(tuple.y, -2.);

        let vector: Vector = tuple.into();
        assert_eq!(vector, Vector::new(1., -2.));

        let point: Point = tuple.into();
        assert_eq!(point, Point::new(1., -2.));
    }
}
