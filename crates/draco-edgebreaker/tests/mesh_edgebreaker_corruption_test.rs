use draco_edgebreaker::{
    DecoderBuffer, DracoError, EncoderBuffer, EncoderOptions, Mesh,
    MeshEdgebreakerConnectivityEncodingMethod, MeshEdgebreakerDecoder, MeshEdgebreakerEncoder,
};

fn create_grid_faces(width: u32, height: u32) -> Vec<[u32; 3]> {
    let row = width + 1;
    let mut faces = Vec::new();
    for y in 0..height {
        for x in 0..width {
            let v = y * row + x;
            faces.push([v, v + 1, v + row + 1]);
            faces.push([v, v + row + 1, v + row]);
        }
    }
    faces
}

fn encode(faces: &[[u32; 3]], method: MeshEdgebreakerConnectivityEncodingMethod) -> Vec<u8> {
    let mut options = EncoderOptions::new();
    options.set_edgebreaker_method(method);
    let mut buffer = EncoderBuffer::new();
    MeshEdgebreakerEncoder::new(options)
        .encode_connectivity(&Mesh::from_faces(faces), &mut buffer)
        .expect("Encode failed");
    buffer.data().to_vec()
}

fn decode(data: &[u8]) -> Result<usize, DracoError> {
    let mut input = DecoderBuffer::new(data);
    MeshEdgebreakerDecoder::new()
        .decode_connectivity(&mut input)
        .map(|decoded| decoded.num_faces())
}

#[test]
fn test_valid_stream_decodes() {
    let data = encode(
        &create_grid_faces(3, 3),
        MeshEdgebreakerConnectivityEncodingMethod::Standard,
    );
    assert_eq!(decode(&data), Ok(18));
}

#[test]
fn test_truncated_streams_fail() {
    for method in [
        MeshEdgebreakerConnectivityEncodingMethod::Standard,
        MeshEdgebreakerConnectivityEncodingMethod::Valence,
    ] {
        let data = encode(&create_grid_faces(3, 3), method);
        for len in 0..data.len() {
            assert!(
                decode(&data[..len]).is_err(),
                "{method:?} stream truncated to {len} of {} bytes decoded",
                data.len()
            );
        }
    }
}

#[test]
fn test_unknown_method_byte() {
    let mut data = encode(
        &create_grid_faces(2, 2),
        MeshEdgebreakerConnectivityEncodingMethod::Standard,
    );
    for method in [1u8, 3, 0xff] {
        data[0] = method;
        assert!(matches!(decode(&data), Err(DracoError::UnsupportedFeature(_))));
    }
}

#[test]
fn test_mangled_header_counts() {
    // Layout: method, vertices, faces, attribute data, symbols, split symbols.
    let original = encode(
        &create_grid_faces(3, 3),
        MeshEdgebreakerConnectivityEncodingMethod::Standard,
    );
    assert_eq!(original[1], 16);
    assert_eq!(original[2], 18);
    assert_eq!(original[4], 18);

    let mut data = original.clone();
    data[1] = 0x7f;
    assert!(matches!(decode(&data), Err(DracoError::InvalidData(_))), "too many vertices");

    let mut data = original.clone();
    data[2] = 0x7f;
    assert!(matches!(decode(&data), Err(DracoError::InvalidData(_))), "too many faces");

    let mut data = original.clone();
    data[4] = 0;
    assert!(matches!(decode(&data), Err(DracoError::InvalidData(_))), "no symbols");

    let mut data = original.clone();
    data[5] = 0x7f;
    assert!(matches!(decode(&data), Err(DracoError::InvalidData(_))), "too many split symbols");
}

#[test]
fn test_valence_header_counts_bounded_by_stream_size() {
    // A tiny valence stream that declares tens of millions of elements.
    let mut stream = EncoderBuffer::new();
    stream
        .encode_u8(MeshEdgebreakerConnectivityEncodingMethod::Valence as u8)
        .expect("Write failed");
    stream.encode_varint(60_000_000).expect("Write failed");
    stream.encode_varint(60_000_000).expect("Write failed");
    stream.encode_u8(0).expect("Write failed");
    stream.encode_varint(60_000_000).expect("Write failed");
    stream.encode_varint(0).expect("Write failed");
    stream.encode_varint(0).expect("Write failed");
    stream.encode_data(&[0; 4]).expect("Write failed");
    assert_eq!(stream.size(), 20);

    assert!(matches!(decode(stream.data()), Err(DracoError::InvalidData(_))));

    // A real valence stream still fits the bound.
    let data = encode(&create_grid_faces(3, 3), MeshEdgebreakerConnectivityEncodingMethod::Valence);
    assert_eq!(decode(&data), Ok(18));
}

#[test]
fn test_unsupported_version() {
    let data = encode(
        &create_grid_faces(2, 2),
        MeshEdgebreakerConnectivityEncodingMethod::Standard,
    );
    for (major, minor) in [(3, 0), (2, 3), (0, 9)] {
        let mut input = DecoderBuffer::new(&data);
        input.set_version(major, minor);
        let result = MeshEdgebreakerDecoder::new().decode_connectivity(&mut input);
        assert!(
            matches!(result, Err(DracoError::UnsupportedVersion(_))),
            "version {major}.{minor} accepted"
        );
    }
}

#[test]
fn test_empty_stream() {
    assert!(decode(&[]).is_err());
    assert!(decode(&[0]).is_err());
}
