use ros1_msgs::rospy_tutorials::srv::{AddTwoInts, AddTwoIntsRequest, AddTwoIntsResponse};
use ros1_msgs::std_msgs::msg::{Empty, Header, String as StringMsg};
use ros1_msgs::test_msgs::msg::{
    AllPrimitives, Constants, Counter, FixedArrays, Nested, Pair, Sample,
};
use ros1_msgs::test_msgs::srv::Reset;
use ros1_types::{Error, HashCode, RosMessage, RosService, Time, TryClone};
use std::collections::HashSet;

#[test]
fn test_metadata_matches_ros_distribution() {
    assert_eq!(StringMsg::MD5SUM, "992ce8a1687cec8c8bd883ec73ca41d1");
    assert_eq!(StringMsg::DATA_TYPE, "std_msgs/String");
    assert_eq!(StringMsg::DEFINITION, "string data\n");
    assert_eq!(StringMsg::QUALIFIED_NAME, "ros.std_msgs.String");
    assert_eq!(Empty::MD5SUM, "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(Header::MD5SUM, "2176decaecbce78abc3b96ef049fabed");

    assert_eq!(AddTwoInts::MD5SUM, "6a2e34150c00229791cc89ff309fff21");
    assert_eq!(AddTwoInts::DATA_TYPE, "rospy_tutorials/AddTwoInts");
    assert_eq!(AddTwoIntsRequest::MD5SUM, "36d09b846be0b371c5f190354dd3153e");
    assert_eq!(AddTwoIntsResponse::MD5SUM, "b88405221c77b1878a3cbbfff53428d7");
    assert_eq!(
        <AddTwoInts as RosService>::Request::DATA_TYPE,
        "rospy_tutorials/AddTwoIntsRequest"
    );
}

#[test]
fn test_full_definition_embeds_dependencies() {
    let separator = "=".repeat(80);
    let expected = format!(
        "Header header\nPair fixed\nSample[] samples\nstring[] names\nuint8[] payload\ntime[2] window\n\n\
         {separator}\nMSG: std_msgs/Header\nuint32 seq\ntime stamp\nstring frame_id\n\n\
         {separator}\nMSG: test_msgs/Pair\nint32[2] pair\n\n\
         {separator}\nMSG: test_msgs/Sample\nuint16 count\nfloat64[] samples\n"
    );
    assert_eq!(Nested::DEFINITION, expected);
}

#[test]
fn test_sample_wire_layout() {
    let sample = Sample {
        count: 0x0102,
        samples: vec![1.0, 2.0, 3.0],
    };
    assert_eq!(sample.serialization_length(), 30);

    let bytes = sample.to_bytes().unwrap();
    assert_eq!(bytes.len(), 30);
    assert_eq!(&bytes[..6], &[0x02, 0x01, 0x03, 0x00, 0x00, 0x00]);
    assert_eq!(&bytes[6..14], &1.0f64.to_le_bytes());

    let decoded = Sample::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, sample);
}

#[test]
fn test_fixed_array_has_no_length_prefix() {
    let pair = Pair { pair: [1, -1] };
    assert_eq!(pair.serialization_length(), 8);
    assert_eq!(
        pair.to_bytes().unwrap(),
        [0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn test_unsigned_max_survives_round_trip() {
    let counter = Counter { value: u32::MAX };
    let bytes = counter.to_bytes().unwrap();
    assert_eq!(bytes, [0xff, 0xff, 0xff, 0xff]);
    assert_eq!(Counter::from_bytes(&bytes).unwrap().value, 4_294_967_295);
}

#[test]
fn test_all_primitives_length_and_round_trip() {
    let msg = AllPrimitives {
        flag: true,
        i8_value: -8,
        u8_value: 8,
        legacy_byte: -1,
        legacy_char: b'c',
        i16_value: -16,
        u16_value: 16,
        i32_value: -32,
        u32_value: 32,
        i64_value: -64,
        u64_value: u64::MAX,
        f32_value: 0.25,
        f64_value: -0.5,
        text: "héllo".to_string(),
        stamp: Time::new(10, 20),
        elapsed: ros1_types::Duration::new(-1, 5),
    };
    // the string is 4 + 6 bytes, time and duration 8 each
    assert_eq!(msg.serialization_length(), 5 + 4 + 8 + 16 + 4 + 8 + 10 + 8 + 8);

    let bytes = msg.to_bytes().unwrap();
    assert_eq!(bytes.len(), msg.serialization_length());
    assert_eq!(AllPrimitives::from_bytes(&bytes).unwrap(), msg);
}

#[test]
fn test_nested_round_trip_and_deep_clone() {
    let mut msg = Nested::default();
    msg.header.seq = 7;
    msg.header.frame_id = "map".to_string();
    msg.fixed.pair = [3, 4];
    msg.samples.push(Sample {
        count: 1,
        samples: vec![0.5],
    });
    msg.names = vec!["a".to_string(), String::new()];
    msg.payload = vec![0, 1, 2, 255];
    msg.window = [Time::new(1, 0), Time::new(2, 0)];

    let bytes = msg.to_bytes().unwrap();
    assert_eq!(bytes.len(), msg.serialization_length());
    let decoded = Nested::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, msg);

    let mut copy = msg.clone();
    copy.samples[0].samples[0] = 9.0;
    assert_eq!(msg.samples[0].samples[0], 0.5);
    assert_ne!(copy, msg);

    assert_eq!(msg.try_clone(), Some(msg.clone()));
}

#[test]
fn test_defaults() {
    let msg = Nested::default();
    assert_eq!(msg.header.seq, 0);
    assert!(msg.header.frame_id.is_empty());
    assert_eq!(msg.fixed.pair, [0, 0]);
    assert!(msg.samples.is_empty());
    assert_eq!(msg.window, [Time::default(), Time::default()]);
}

#[test]
fn test_constants() {
    assert_eq!(Constants::X, 123);
    assert_eq!(Constants::FOO, "foo");
    assert!((Constants::RATIO - 0.5).abs() < f64::EPSILON);
    assert_eq!(Constants::MODE_RUN, 1);
    // constants occupy no space on the wire
    assert_eq!(Constants::default().serialization_length(), 1);
}

#[test]
fn test_equality_and_hash_codes() {
    let a = Sample {
        count: 2,
        samples: vec![f64::NAN],
    };
    let b = a.clone();
    // floats compare by bit pattern, so NaN equals itself
    assert_eq!(a, b);
    assert_eq!(a.hash_code(), b.hash_code());

    let zero = Sample {
        count: 0,
        samples: vec![0.0],
    };
    let negative_zero = Sample {
        count: 0,
        samples: vec![-0.0],
    };
    assert_ne!(zero, negative_zero);

    let set: HashSet<Sample> = [a, b, zero].into_iter().collect();
    assert_eq!(set.len(), 2);

    assert_eq!(Empty::default().hash_code(), 1);
    assert_eq!(Empty::default(), Empty::default());
}

#[test]
fn test_decode_errors() {
    let bytes = Sample {
        count: 1,
        samples: vec![1.0],
    }
    .to_bytes()
    .unwrap();

    assert!(matches!(
        Sample::from_bytes(&bytes[..bytes.len() - 1]),
        Err(Error::UnexpectedEof { .. })
    ));

    let mut trailing = bytes.clone();
    trailing.push(0);
    assert!(matches!(
        Sample::from_bytes(&trailing),
        Err(Error::TrailingBytes { .. })
    ));

    // a declared length larger than the buffer fails without allocating it
    let bogus = [0x00, 0x00, 0xff, 0xff, 0xff, 0x7f];
    assert!(Sample::from_bytes(&bogus).is_err());

    // invalid UTF-8 in a string field
    let bad_utf8 = [0x01, 0x00, 0x00, 0x00, 0xff];
    assert!(matches!(
        StringMsg::from_bytes(&bad_utf8),
        Err(Error::InvalidUtf8(_))
    ));
}

#[test]
fn test_service_with_empty_request_and_response() {
    assert_eq!(Reset::MD5SUM, "d41d8cd98f00b204e9800998ecf8427e");
    let request = <Reset as RosService>::Request::default();
    assert!(request.to_bytes().unwrap().is_empty());
}

#[test]
fn test_count_and_samples_scenario() {
    let sample = Sample {
        count: 3,
        samples: vec![1.5, -2.25, 0.0],
    };
    let bytes = sample.to_bytes().unwrap();
    assert_eq!(bytes.len(), 2 + 4 + 3 * 8);
    assert_eq!(&bytes[..2], &[0x03, 0x00]);
    assert_eq!(&bytes[2..6], &[0x03, 0x00, 0x00, 0x00]);
    assert_eq!(&bytes[14..22], &(-2.25f64).to_le_bytes());
    assert_eq!(Sample::from_bytes(&bytes).unwrap(), sample);
}

#[test]
fn test_fixed_pair_scenario() {
    let pair = Pair { pair: [7, -7] };
    assert_eq!(pair.serialization_length(), 8);
    let bytes = pair.to_bytes().unwrap();
    assert_eq!(bytes, [0x07, 0x00, 0x00, 0x00, 0xf9, 0xff, 0xff, 0xff]);
    assert_eq!(Pair::from_bytes(&bytes).unwrap(), pair);
}

#[test]
fn test_empty_value_is_all_zero_bytes() {
    let msg = FixedArrays::default();
    assert!(msg.stamps.is_empty());
    assert!(msg.pair_samples.iter().all(|s| s.samples.is_empty()));

    // fixed arrays write their elements only, so no count of 2 or 3 appears
    let bytes = msg.to_bytes().unwrap();
    assert_eq!(msg.serialization_length(), 2 * 6 + 2 * 4 + 6 + 3 + 4);
    assert_eq!(bytes, vec![0u8; 33]);
    assert_eq!(FixedArrays::from_bytes(&bytes).unwrap(), msg);

    let sample = Sample::default();
    assert_eq!(sample.to_bytes().unwrap(), vec![0u8; 6]);
    assert_eq!(Sample::from_bytes(&[0; 6]).unwrap(), sample);
}

#[test]
fn test_fixed_composite_and_string_arrays() {
    let msg = FixedArrays {
        pair_samples: [
            Sample {
                count: 1,
                samples: vec![2.0],
            },
            Sample {
                count: 2,
                samples: Vec::new(),
            },
        ],
        labels: ["ab".to_string(), "c".to_string()],
        single: Sample {
            count: 3,
            samples: Vec::new(),
        },
        triple: [1, 2, 3],
        stamps: vec![Time::new(5, 6)],
    };
    assert_eq!(msg.serialization_length(), 20 + 11 + 6 + 3 + 12);

    let bytes = msg.to_bytes().unwrap();
    assert_eq!(bytes.len(), 52);
    // pair_samples[0] starts right away with its count
    assert_eq!(&bytes[..6], &[0x01, 0x00, 0x01, 0x00, 0x00, 0x00]);
    assert_eq!(&bytes[6..14], &2.0f64.to_le_bytes());
    assert_eq!(&bytes[14..20], &[0x02, 0x00, 0x00, 0x00, 0x00, 0x00]);
    // each label keeps its own length prefix
    assert_eq!(&bytes[20..31], b"\x02\x00\x00\x00ab\x01\x00\x00\x00c");
    assert_eq!(&bytes[31..37], &[0x03, 0x00, 0x00, 0x00, 0x00, 0x00]);
    assert_eq!(&bytes[37..40], &[1, 2, 3]);
    assert_eq!(
        &bytes[40..],
        &[0x01, 0x00, 0x00, 0x00, 0x05, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00]
    );

    let decoded = FixedArrays::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, msg);
    assert_eq!(decoded.hash_code(), msg.hash_code());
    assert_eq!(msg.try_clone(), Some(msg.clone()));

    assert!(matches!(
        FixedArrays::from_bytes(&bytes[..51]),
        Err(Error::UnexpectedEof { .. })
    ));
}
