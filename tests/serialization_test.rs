mod common;
use common::*;
use scenevm::mach::{serialize, Frame, Machine};
use scenevm::mem::{ErrorCode, IntBank, StrBank};

#[test]
fn test_global_round_trip() {
    let source = populated_global();
    let bytes = global_bytes(&source);
    let mut target = Machine::default();
    target.memory_mut().write_word('G', 5, 99).unwrap();
    serialize::load_global_memory(&mut bytes.as_slice(), &mut target).unwrap();
    assert_eq!(target.memory().global(), source.memory().global());
    assert_eq!(target.memory().read_word('G', 5).unwrap(), 0);
    assert_eq!(target.memory().read_word('G', 1999).unwrap(), 0x2628_2940);
    assert_eq!(target.memory().names().name(701).unwrap(), "Zed");
    assert_eq!(target.memory().names().local_name(26).unwrap(), "Aa");
    assert!(target.memory().has_been_read(1, 65535));
    assert!(target.memory().has_been_read(9000, 12));
    assert!(!target.memory().has_been_read(9000, 13));
}

#[test]
fn test_global_save_leaves_local_alone() {
    let mut source = populated_global();
    source.memory_mut().write_word('A', 0, 7).unwrap();
    let bytes = global_bytes(&source);
    let mut target = Machine::default();
    target.memory_mut().write_word('A', 0, 3).unwrap();
    serialize::load_global_memory(&mut bytes.as_slice(), &mut target).unwrap();
    assert_eq!(target.memory().read_word('A', 0).unwrap(), 3);
}

#[test]
fn test_savepoint_isolation() {
    let mut machine = Machine::default();
    machine.memory_mut().write_word('A', 10, 111).unwrap();
    machine.mark_savepoint();
    machine.memory_mut().write_word('A', 10, 222).unwrap();
    assert_eq!(machine.memory().read_word('A', 10).unwrap(), 222);

    let bytes = game_bytes(&machine);
    assert_eq!(machine.memory().read_word('A', 10).unwrap(), 222);
    serialize::load_game(&mut bytes.as_slice(), &mut machine).unwrap();
    assert_eq!(machine.memory().read_word('A', 10).unwrap(), 111);
    assert_eq!(&machine.savepoint().local, machine.local_memory());
}

#[test]
fn test_game_round_trip_resumes() {
    let mut source = populated_global();
    source.set_title("Rooftop");
    source.memory_mut().write_string('S', 4, "scratch").unwrap();
    source.memory_mut().write_string('K', 2, "param").unwrap();
    source.memory_mut().write_word('L', 39, -1).unwrap();
    source.jump(12, 300);
    source.farcall(40, 0).unwrap();
    source.gosub(88).unwrap();
    source.mark_savepoint();
    source.return_from_gosub().unwrap();
    source.memory_mut().write_string('S', 4, "changed").unwrap();

    let bytes = game_bytes(&source);
    let mut target = Machine::default();
    target.set_store_register(5);
    target.halt();
    serialize::load_game(&mut bytes.as_slice(), &mut target).unwrap();

    assert_eq!(target.memory().global(), source.memory().global());
    assert_eq!(target.local_memory(), &source.savepoint().local);
    assert_eq!(target.memory().read_string('S', 4).unwrap(), "scratch");
    assert_eq!(target.string_value(StrBank::K, 2).unwrap(), "param");
    assert_eq!(target.int_value(&int(IntBank::L, 39)).unwrap(), -1);
    assert_eq!(target.title(), "Rooftop");
    assert_eq!((target.state().scene(), target.state().pc()), (40, 88));
    assert_eq!(
        target.state().frames(),
        &[Frame::Farcall { scene: 12, pc: 300 }, Frame::Gosub { pc: 0 }][..]
    );
    assert!(!target.halted());
    assert_eq!(target.store_register(), 0);

    target.return_from_gosub().unwrap();
    target.return_from_farcall().unwrap();
    assert_eq!((target.state().scene(), target.state().pc()), (12, 300));
}

#[test]
fn test_corrupt_game_leaves_machine_untouched() {
    let mut source = populated_global();
    source.memory_mut().write_word('B', 1, 1).unwrap();
    source.mark_savepoint();
    let good = game_bytes(&source);

    let mut target = Machine::default();
    target.memory_mut().write_word('B', 1, 50).unwrap();
    target.memory_mut().write_word('Z', 0, 60).unwrap();
    target.jump(3, 4);
    let before_global = target.memory().global().clone();
    let before_local = target.local_memory().clone();

    let mut flipped = good.clone();
    let mid = flipped.len() / 2;
    flipped[mid] ^= 0xFF;
    let cases = vec![
        good[..good.len() / 3].to_vec(),
        good[..good.len() - 1].to_vec(),
        flipped,
        b"SVSG\x01\x00\x00\x00".to_vec(),
        vec![],
    ];
    for bytes in cases {
        let err = serialize::load_game(&mut bytes.as_slice(), &mut target).unwrap_err();
        assert_eq!(err.code(), ErrorCode::CorruptData);
        assert_eq!(target.memory().global(), &before_global);
        assert_eq!(target.local_memory(), &before_local);
        assert_eq!((target.state().scene(), target.state().pc()), (3, 4));
    }
}

#[test]
fn test_deep_stack_rejected_by_shallow_machine() {
    let mut source = Machine::default();
    for pc in 0..5 {
        source.gosub(pc).unwrap();
    }
    source.mark_savepoint();
    let bytes = game_bytes(&source);
    let mut target = Machine::new(scenevm::mach::MachineConfig::default().with_max_call_depth(4));
    let err = serialize::load_game(&mut bytes.as_slice(), &mut target).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CorruptData);
    assert_eq!(target.state().depth(), 0);
}
