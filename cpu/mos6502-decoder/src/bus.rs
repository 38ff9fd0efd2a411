/// Read access to the 6502's 16-bit address space.
///
/// Reads are assumed to be total over the full address space. Any side effects of a read (e.g.
/// memory-mapped I/O registers that clear on read) are the implementor's concern.
pub trait BusInterface {
    fn read(&mut self, address: u16) -> u8;
}

impl<F> BusInterface for F
where
    F: FnMut(u16) -> u8,
{
    #[inline]
    fn read(&mut self, address: u16) -> u8 {
        self(address)
    }
}

impl BusInterface for [u8; 0x10000] {
    #[inline]
    fn read(&mut self, address: u16) -> u8 {
        self[address as usize]
    }
}

#[inline]
pub(crate) fn read_word<B: BusInterface + ?Sized>(bus: &mut B, address: u16) -> u16 {
    let lsb = bus.read(address);
    let msb = bus.read(address.wrapping_add(1));
    u16::from_le_bytes([lsb, msb])
}

/// Read a word without carrying into the high byte of the pointer, i.e. the second byte is read
/// from the start of the same page when the pointer's low byte is $FF.
#[inline]
pub(crate) fn read_word_page_wrapped<B: BusInterface + ?Sized>(bus: &mut B, address: u16) -> u16 {
    let [pointer_lsb, pointer_msb] = address.to_le_bytes();
    let lsb = bus.read(address);
    let msb = bus.read(u16::from_le_bytes([pointer_lsb.wrapping_add(1), pointer_msb]));
    u16::from_le_bytes([lsb, msb])
}
