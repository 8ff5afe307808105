//! Lenient decoding of integers which the node sends either as JSON numbers
//! or as decimal strings.

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;


struct IntParser<T> {
    phantom_data: PhantomData<T>
}


impl <T> IntParser<T> {
    fn new() -> Self {
        Self {
            phantom_data: PhantomData
        }
    }
}


impl <'de, T> serde::de::Visitor<'de> for IntParser<T>
where
    T: FromStr + TryFrom<u64> + TryFrom<i64>
{
    type Value = T;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "an integer or a string literal representing {}", std::any::type_name::<T>())
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        <T as TryFrom<u64>>::try_from(v).map_err(|_| out_of_range::<T, E>(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        <T as TryFrom<i64>>::try_from(v).map_err(|_| out_of_range::<T, E>(v))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        // serde_json yields floats for integers beyond u64
        Err(E::custom(format!(
            "{} is not a valid {}, integers above u64 must be sent as decimal strings",
            v,
            std::any::type_name::<T>()
        )))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        T::from_str(v.trim()).map_err(|_| {
            serde::de::Error::custom(
                format!("failed to deserialize `{}` as {}", v, std::any::type_name::<T>())
            )
        })
    }
}


fn out_of_range<T, E: serde::de::Error>(v: impl Display) -> E {
    E::custom(format!("{} is out of range for {}", v, std::any::type_name::<T>()))
}


/// Decodes an integer from either a JSON number or a decimal string.
///
/// Use it as `#[serde(deserialize_with = "lkl_primitives::serde::decode_int")]`.
pub fn decode_int<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where D: serde::Deserializer<'de>,
      T: FromStr + TryFrom<u64> + TryFrom<i64>
{
    deserializer.deserialize_any(IntParser::<T>::new())
}


#[cfg(test)]
mod test {
    use serde::Deserialize;


    #[derive(Deserialize, Debug)]
    struct Sample {
        #[serde(deserialize_with = "super::decode_int")]
        depth: u64,
        #[serde(deserialize_with = "super::decode_int")]
        amount: u128
    }


    #[test]
    fn accepts_numbers_and_strings() {
        let s: Sample = serde_json::from_str(r#"{"depth": 10, "amount": "340282366920938463463374607431768211455"}"#).unwrap();
        assert_eq!(s.depth, 10);
        assert_eq!(s.amount, u128::MAX);

        let s: Sample = serde_json::from_str(r#"{"depth": "7", "amount": 5}"#).unwrap();
        assert_eq!(s.depth, 7);
        assert_eq!(s.amount, 5);
    }

    #[test]
    fn rejects_garbage() {
        assert!(serde_json::from_str::<Sample>(r#"{"depth": "ten", "amount": 1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"depth": -1, "amount": 1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"depth": 1.5, "amount": 1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"amount": 1}"#).is_err());
    }

    #[test]
    fn large_numeric_amount_asks_for_a_string() {
        let err = serde_json::from_str::<Sample>(
            r#"{"depth": 1, "amount": 340282366920938463463374607431768211455}"#
        ).unwrap_err();
        assert!(err.to_string().contains("must be sent as decimal strings"), "{}", err);
    }
}
