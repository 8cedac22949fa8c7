//! Per-dot rendering work: background fetches, sprite evaluation and fetch,
//! and pixel composition.
//!
//! Fetch timing and scroll updates follow the immediate `$2001` value; what
//! ends up on screen (clipping, greyscale, sprite-0 hit) follows the delayed
//! copy kept by the mask delay ring.

use super::{
    Ppu,
    palette,
    pattern_bus::PpuBus,
    registers::Status,
    sprite::{self, SpriteView},
    sprite_eval::{CLEAR_END_DOT, EVAL_END_DOT, EVAL_START_DOT},
    sprite_pipeline::SpritePixel,
    timing::{LineKind, PRE_RENDER_SCANLINE},
};
use crate::memory::ppu as ppu_mem;

/// Offset of the high bitplane from the low one in a pattern tile.
const PATTERN_HIGH_PLANE: u16 = 8;
/// Palette RAM offset of the sprite palettes.
const SPRITE_PALETTE_BASE: u8 = 0x10;
const SPRITE_FETCH_START_DOT: u16 = 257;
const SPRITE_FETCH_END_DOT: u16 = 320;

impl Ppu {
    /// Rendering is on and the beam is on a line that fetches.
    fn rendering_active(&self) -> bool {
        self.registers.mask.rendering_enabled() && self.timing.is_rendering_line()
    }

    /// Reads PPU memory for a rendering fetch and puts the address on the
    /// CHR bus for the A12 detector.
    fn fetch(&mut self, addr: u16, bus: &mut PpuBus<'_>) -> u8 {
        self.a12.observe(addr);
        let open_bus = self.open_bus.sample();
        self.vram.read(addr, self.mirroring, bus, open_bus)
    }

    pub(super) fn clock_a12(&mut self, bus: &mut PpuBus<'_>) {
        if !self.rendering_active() || self.timing.cycle == 0 {
            return;
        }
        if self.a12.clock() {
            bus.notify_a12_rising();
        }
    }

    /// Overwrites the OAM row latched by a mid-line rendering disable with
    /// row 0, on the first rendering dot afterwards.
    pub(super) fn apply_oam_corruption(&mut self) {
        if !self.rendering_active() {
            return;
        }
        let Some(row) = self.oam_corruption_row.take() else {
            return;
        };
        if row == 0 {
            return;
        }
        let start = usize::from(row) * 8;
        self.oam.copy_within(0..8, start);
        tracing::trace!(row, "oam row corrupted by rendering disable");
    }

    pub(super) fn background_step(&mut self, bus: &mut PpuBus<'_>) {
        if !self.rendering_active() {
            return;
        }
        let dot = self.timing.cycle;

        if matches!(dot, 2..=257 | 322..=337) {
            self.bg.shift();
        }
        if matches!(dot, 9..=257 | 329..=337) && (dot - 1) % 8 == 0 {
            self.bg.reload();
        }

        if matches!(dot, 1..=256 | 321..=336) {
            match (dot - 1) % 8 {
                1 => {
                    let addr = self.registers.vram.v.tile_addr();
                    self.bg.latches.nametable = self.fetch(addr, bus);
                }
                3 => {
                    let v = self.registers.vram.v;
                    let byte = self.fetch(v.attribute_addr(), bus);
                    self.bg.latches.attribute = (byte >> v.attribute_shift()) & 0b11;
                }
                5 => {
                    let addr = self.bg_pattern_addr();
                    self.bg.latches.pattern_low = self.fetch(addr, bus);
                }
                7 => {
                    let addr = self.bg_pattern_addr() + PATTERN_HIGH_PLANE;
                    self.bg.latches.pattern_high = self.fetch(addr, bus);
                    self.registers.vram.v.increment_x();
                }
                _ => {}
            }
        }

        match dot {
            256 => self.registers.vram.v.increment_y(),
            257 => {
                let t = self.registers.vram.t;
                self.registers.vram.v.copy_horizontal(t);
            }
            280..=304 if self.timing.scanline == PRE_RENDER_SCANLINE => {
                let t = self.registers.vram.t;
                self.registers.vram.v.copy_vertical(t);
            }
            338 | 340 => {
                let addr = self.registers.vram.v.tile_addr();
                self.fetch(addr, bus);
            }
            _ => {}
        }
    }

    fn bg_pattern_addr(&self) -> u16 {
        let base = self.registers.control.background_pattern_table();
        let tile = u16::from(self.bg.latches.nametable);
        base | (tile << 4) | u16::from(self.registers.vram.v.fine_y())
    }

    pub(super) fn sprite_step(&mut self, bus: &mut PpuBus<'_>) {
        if !self.rendering_active() {
            return;
        }
        let dot = self.timing.cycle;
        match dot {
            1..=CLEAR_END_DOT => self.sprite_eval.clear_step(dot, &mut self.secondary_oam),
            EVAL_START_DOT..=EVAL_END_DOT if self.timing.line_kind() == LineKind::Visible => {
                let next_line = self.timing.scanline + 1;
                let height = self.registers.control.sprite_height();
                let overflow = self.sprite_eval.evaluate_step(
                    dot,
                    &self.oam,
                    &mut self.secondary_oam,
                    next_line,
                    height,
                );
                if overflow {
                    self.registers.status.insert(Status::SPRITE_OVERFLOW);
                }
            }
            SPRITE_FETCH_START_DOT..=SPRITE_FETCH_END_DOT => {
                if dot == SPRITE_FETCH_START_DOT {
                    self.registers.oam_addr = 0;
                }
                self.sprite_fetch_step(dot, bus);
            }
            _ => {}
        }
    }

    /// One dot of the sprite fetch: 8 dots per secondary-OAM slot, two
    /// garbage nametable reads followed by the two pattern bytes.
    fn sprite_fetch_step(&mut self, dot: u16, bus: &mut PpuBus<'_>) {
        let offset = dot - SPRITE_FETCH_START_DOT;
        let lane = usize::from(offset / 8);
        let sub = offset % 8;
        let Some(view) = SpriteView::at_index(&self.secondary_oam, lane) else {
            return;
        };
        let (y, tile, attributes, x) = (view.y(), view.tile(), view.attributes(), view.x());
        self.sprite_eval
            .set_secondary_addr((lane * SpriteView::BYTES_PER_SPRITE) as u8 + sub.min(3) as u8);

        match sub {
            1 | 3 => {
                let addr = self.registers.vram.v.tile_addr();
                self.fetch(addr, bus);
            }
            5 | 7 => {
                let next_line = self.timing.scanline + 1;
                let row = (next_line - i16::from(y)) as u8;
                let mut addr = sprite::pattern_addr(tile, row, attributes, self.registers.control);
                if sub == 7 {
                    addr += PATTERN_HIGH_PLANE;
                }
                let data = self.fetch(addr, bus);
                if sub == 5 {
                    self.sprite_eval.latch_fetch_pattern_low(data);
                } else if lane < usize::from(self.sprite_eval.found()) {
                    let low = self.sprite_eval.fetch_pattern_low();
                    let source = self.sprite_eval.source_index(lane);
                    self.sprites.load_lane(lane, low, data, attributes, x, source);
                } else {
                    self.sprites.clear_lane(lane);
                }
            }
            _ => {}
        }
    }

    /// Composes the pixel for the current dot of a visible line and writes it
    /// to the framebuffer, if one is attached.
    pub(super) fn pixel_step(&mut self) {
        let dot = self.timing.cycle;
        if self.timing.line_kind() != LineKind::Visible || !(1..=256).contains(&dot) {
            return;
        }
        let x = dot - 1;
        let mask = self.mask_delay.effective();

        let (bg_palette, bg_pattern) = if mask.background_visible_at(x) {
            self.bg.sample(self.registers.vram.x)
        } else {
            (0, 0)
        };
        let sprite = if self.registers.mask.rendering_enabled() {
            self.sprites.sample_and_shift()
        } else {
            SpritePixel::default()
        };
        let sprite = if mask.sprites_visible_at(x) {
            sprite
        } else {
            SpritePixel::default()
        };

        let bg_opaque = bg_pattern != 0;
        if sprite.is_sprite0
            && sprite.is_opaque()
            && bg_opaque
            && mask.show_background()
            && mask.show_sprites()
            && dot >= 2
            && x < 255
        {
            self.registers.status.insert(Status::SPRITE_ZERO_HIT);
        }

        let bg_entry = (bg_palette << 2) | bg_pattern;
        let sprite_entry = SPRITE_PALETTE_BASE | (sprite.palette << 2) | sprite.color;
        let entry = match (bg_opaque, sprite.is_opaque()) {
            (false, false) => 0,
            (false, true) => sprite_entry,
            (true, false) => bg_entry,
            (true, true) if sprite.behind_background => bg_entry,
            (true, true) => sprite_entry,
        };

        // With both layers off, a `v` pointing into palette RAM shows that
        // entry instead of the backdrop.
        let v = self.registers.vram.v.raw() & ppu_mem::VRAM_MIRROR_MASK;
        let entry = if !mask.rendering_enabled() && v >= ppu_mem::PALETTE_BASE {
            (v & 0x1F) as u8
        } else {
            entry
        };

        let index = palette::apply_greyscale(self.vram.palette_entry(entry), mask.greyscale());
        if let Some(framebuffer) = self.framebuffer.as_mut() {
            framebuffer.write(usize::from(x), self.timing.scanline as usize, palette::color(index));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        cartridge::{Mapper, Mirroring, Nrom},
        memory::ppu::Register as PpuRegister,
        ppu::{Ppu, PpuBus, PpuConfig},
    };

    fn ready_ppu() -> Ppu {
        Ppu::new(PpuConfig {
            warmup: false,
            ..PpuConfig::default()
        })
    }

    fn run_to(ppu: &mut Ppu, bus: &mut PpuBus<'_>, scanline: i16, cycle: u16) {
        while ppu.scanline() != scanline || ppu.cycle() != cycle {
            ppu.tick(bus);
        }
    }

    #[test]
    fn oam_addr_is_cleared_at_dot_257_when_rendering() {
        let mut ppu = ready_ppu();
        let mut bus = PpuBus::headless();
        ppu.write_register(PpuRegister::Mask.addr(), 0x18, &mut bus);
        // The pre-render line already clears it, so load it on line 0.
        run_to(&mut ppu, &mut bus, 0, 200);
        ppu.write_register(PpuRegister::OamAddr.addr(), 0x40, &mut bus);
        run_to(&mut ppu, &mut bus, 0, 256);
        assert_eq!(ppu.oam_addr(), 0x40);
        ppu.tick(&mut bus);
        assert_eq!(ppu.oam_addr(), 0);
    }

    #[test]
    fn disabling_rendering_mid_line_corrupts_oam_row() {
        let mut ppu = ready_ppu();
        let mut bus = PpuBus::headless();
        let mut page = [0u8; 256];
        for (i, byte) in page.iter_mut().enumerate() {
            *byte = i as u8;
        }
        ppu.write_oam_dma(&page);
        ppu.write_register(PpuRegister::Mask.addr(), 0x18, &mut bus);

        // Secondary-OAM counter during the clear points at (dot - 1) / 2.
        run_to(&mut ppu, &mut bus, 5, 20);
        ppu.write_register(PpuRegister::Mask.addr(), 0x00, &mut bus);
        assert_eq!(&ppu.oam()[72..80], &page[72..80]);

        ppu.write_register(PpuRegister::Mask.addr(), 0x18, &mut bus);
        ppu.tick(&mut bus);
        assert_eq!(&ppu.oam()[72..80], &page[0..8]);
        assert_eq!(&ppu.oam()[0..8], &page[0..8]);
    }

    #[test]
    fn background_fetches_walk_the_pattern_table() {
        let mut board = Nrom::with_chr_ram(Mirroring::Horizontal);
        // Tile 1, row 0: low plane 0xFF, high plane 0x00.
        board.chr_write(0x0010, 0xFF);
        let mut bus = PpuBus::new(Some(&mut board as &mut dyn Mapper));
        let mut ppu = ready_ppu();
        ppu.write_register(PpuRegister::Addr.addr(), 0x20, &mut bus);
        ppu.write_register(PpuRegister::Addr.addr(), 0x00, &mut bus);
        ppu.write_register(PpuRegister::Data.addr(), 0x01, &mut bus);
        // Backdrop 0x0F, background color 1 = 0x30.
        ppu.write_register(PpuRegister::Addr.addr(), 0x3F, &mut bus);
        ppu.write_register(PpuRegister::Addr.addr(), 0x00, &mut bus);
        ppu.write_register(PpuRegister::Data.addr(), 0x0F, &mut bus);
        ppu.write_register(PpuRegister::Data.addr(), 0x30, &mut bus);
        ppu.write_register(PpuRegister::Addr.addr(), 0x00, &mut bus);
        ppu.write_register(PpuRegister::Addr.addr(), 0x00, &mut bus);
        ppu.attach_framebuffer(vec![0; 256 * 240]);
        ppu.write_register(PpuRegister::Mask.addr(), 0x0A, &mut bus);

        run_to(&mut ppu, &mut bus, 1, 0);
        let fb = ppu.framebuffer().expect("framebuffer attached");
        let white = crate::ppu::ColorFormat::Rgba8888.pack(crate::ppu::palette::color(0x30));
        let black = crate::ppu::ColorFormat::Rgba8888.pack(crate::ppu::palette::color(0x0F));
        assert_eq!(fb.pixel(0, 0), Some(white));
        assert_eq!(fb.pixel(7, 0), Some(white));
        assert_eq!(fb.pixel(8, 0), Some(black));
    }
}
