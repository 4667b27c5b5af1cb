use cubecrypt::*;
use std::io::Cursor;

fn main() {
    let data: &[u8] = &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31];
    println!("data (plaintext): {:?}", data);

    let mut rng = prng::SystemRng; // OS randomness for salt and filler
    //let mut rng = prng::new_fixed_cuberng(42); // reproducible output
    let password = b"correct horse battery staple";

    let mut sealed = Vec::new();
    pipeline::encrypt(password, Cursor::new(data), &mut sealed, &mut rng).unwrap();

    let header = &sealed[..pipeline::HEADER_SIZE];
    println!("marker: {:?}", &header[..4]);
    println!("pad count: {}", header[4]);
    println!("salt (part): {:?}", &header[5..13]);
    println!("chunks: {:?}", &sealed[pipeline::HEADER_SIZE..]);

    let mut opened = Vec::new();
    pipeline::decrypt(password, &sealed[..], &mut opened).unwrap();
    assert_eq!(opened, data);
    println!("data (decrypted): {:?}", opened);

    // No tag: the wrong password "works" and returns noise.
    let mut noise = Vec::new();
    pipeline::decrypt(b"incorrect horse", &sealed[..], &mut noise).unwrap();
    println!("wrong password: {:?}", noise);
}
