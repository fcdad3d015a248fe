/// Color target for the splash: additive blending on the color channels
/// (`src * src_alpha + dst`), alpha accumulated the same way.
pub fn additive_fragment_target(format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
    let additive = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState {
            color: additive,
            alpha: additive,
        }),
        write_mask: wgpu::ColorWrites::ALL,
    }
}

/// Depth state that tests against the host's depth buffer but never writes
/// to it, so overlapping instances all accumulate.
pub fn read_only_depth_state(format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::LessEqual,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}
