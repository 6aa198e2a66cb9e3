// tests/su_tests.rs
use seisio::*;
use std::fs;
use tempfile::tempdir;

fn shot(tracl: i64, len: usize) -> Trace {
    let mut trace = Trace::from_parts(TraceHeader::new(), (0..len).map(|i| (i as f64).sin()).collect());
    trace.header_mut().set_int("tracl", tracl);
    trace.header_mut().set_int("dt", 4000);
    trace.header_mut().set_real("d2", 12.5);
    trace
}

#[test]
fn test_su_roundtrip_both_byte_orders() {
    let dir = tempdir().unwrap();

    for endianness in [Endianness::Big, Endianness::Little] {
        let path = dir.path().join(format!("shots_{:?}.su", endianness));
        {
            let mut writer = SuWriter::create_with_endianness(&path, endianness).unwrap();
            for i in 0..12 {
                writer.write_trace(&shot(i + 1, 250)).unwrap();
            }
            writer.close().unwrap();
        }
        assert_eq!(fs::metadata(&path).unwrap().len(), 12 * (240 + 250 * 4));

        let mut reader = SuReader::open(&path).unwrap();
        assert_eq!(reader.endianness(), endianness);

        let mut count = 0;
        for trace in reader.traces() {
            let trace = trace.unwrap();
            let expected = shot(count + 1, 250);
            assert_eq!(trace.header().get_int("tracl").unwrap(), count + 1);
            assert_eq!(trace.header().get_int("ns").unwrap(), 250);
            assert_eq!(trace.header().get_int("dt").unwrap(), 4000);
            assert_eq!(trace.header().get_real("d2").unwrap(), 12.5);
            for (got, want) in trace.samples().iter().zip(expected.samples()) {
                assert_eq!(*got, *want as f32 as f64);
            }
            count += 1;
        }
        assert_eq!(count, 12);
        assert!(reader.end_of_data());
    }
}

#[test]
fn test_default_su_writer_is_little_endian() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("default.su");
    let mut writer = SuWriter::create(&path).unwrap();
    writer.write_trace(&Trace::new(3)).unwrap();
    writer.close().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[114..116], &[3, 0]);
}

#[test]
fn test_forced_endianness_overrides_detection() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("forced.su");
    let mut writer = SuWriter::create_with_endianness(&path, Endianness::Big).unwrap();
    writer.write_trace(&Trace::new(2)).unwrap();
    writer.close().unwrap();

    let options = ReaderOptions::default().with_endianness(Endianness::Big);
    let mut reader = SuReader::open_with_options(&path, options).unwrap();
    assert_eq!(reader.endianness(), Endianness::Big);
    assert_eq!(reader.read_trace().unwrap().len(), 2);
}

#[test]
fn test_undetectable_byte_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.su");
    fs::write(&path, vec![0u8; 300]).unwrap();

    let err = SuReader::open(&path).err().unwrap();
    assert_eq!(err.code(), Some(ErrorCode::UnknownEndianness));
}

#[test]
fn test_segy_fields_are_unknown_to_su() {
    let mut writer = SuWriter::from_writer(Vec::new(), Endianness::Little);
    let mut trace = Trace::new(1);
    trace.header_mut().set_int("cdpx", 10);
    assert!(matches!(writer.write_trace(&trace), Err(SeisError::UnknownField(name)) if name == "cdpx"));

    // Converting a SEG-Y header: keep only the fields SU knows about
    let map = writer.field_map().clone();
    trace.header_mut().set_int("cdp", 5);
    trace.header_mut().retain(|name, _| map.contains(name));
    writer.write_trace(&trace).unwrap();
    assert_eq!(writer.traces_written(), 1);
}

#[test]
fn test_segy_to_su_conversion() {
    let dir = tempdir().unwrap();
    let segy_path = dir.path().join("in.sgy");
    let su_path = dir.path().join("out.su");

    {
        let mut writer = SegyWriter::create(&segy_path).unwrap();
        for i in 0..5 {
            let mut trace = Trace::from_parts(TraceHeader::new(), vec![i as f64; 16]);
            trace.header_mut().set_int("cdp", 200 + i);
            trace.header_mut().set_int("iline", 7);
            writer.write_trace(&trace).unwrap();
        }
    }

    {
        let mut reader = SegyReader::open(&segy_path).unwrap();
        let mut writer = SuWriter::create(&su_path).unwrap();
        let su_fields = writer.field_map().clone();
        while let Some(mut trace) = reader.next_trace().unwrap() {
            trace.header_mut().retain(|name, _| su_fields.contains(name));
            writer.write_trace(&trace).unwrap();
        }
    }

    let mut reader = SuReader::open(&su_path).unwrap();
    let cdps: Vec<i64> = reader
        .headers()
        .map(|h| h.unwrap().get_int("cdp").unwrap())
        .collect();
    assert_eq!(cdps, vec![200, 201, 202, 203, 204]);
}
